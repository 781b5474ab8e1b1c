//! 各LLM服务商的客户端与Agent封装

use anyhow::Result;
use rig::{
    agent::Agent,
    client::CompletionClient,
    completion::Prompt,
    providers::{
        anthropic, deepseek, gemini,
        gemini::completion::gemini_api_types::{AdditionalParameters, GenerationConfig},
        mistral, moonshot, ollama, openai, openrouter,
    },
};

use crate::config::{LLMConfig, LLMProvider};

/// 构建一个调研用Agent所需的全部参数
struct AgentSpec<'a> {
    model: &'a str,
    preamble: &'a str,
    max_tokens: u64,
    temperature: f64,
}

/// 对不需要额外参数的provider构建Agent；`max_tokens`表示该provider要求显式设置输出上限
macro_rules! build_agent {
    ($client:expr, $spec:expr) => {
        $client
            .agent($spec.model)
            .preamble($spec.preamble)
            .temperature($spec.temperature)
            .build()
    };
    ($client:expr, $spec:expr, max_tokens) => {
        $client
            .agent($spec.model)
            .preamble($spec.preamble)
            .max_tokens($spec.max_tokens)
            .temperature($spec.temperature)
            .build()
    };
}

/// 在所有Agent变体上执行同一次调用
macro_rules! dispatch_prompt {
    ($agent:expr, $prompt:expr, [$($variant:ident),+ $(,)?]) => {
        match $agent {
            $(ProviderAgent::$variant(agent) => Ok(agent.prompt($prompt).await?),)+
        }
    };
}

/// 统一的Provider客户端枚举
#[derive(Clone)]
pub enum ProviderClient {
    OpenAI(openai::Client),
    Moonshot(moonshot::Client),
    DeepSeek(deepseek::Client),
    Mistral(mistral::Client),
    OpenRouter(openrouter::Client),
    Anthropic(anthropic::Client),
    Gemini(gemini::Client),
    Ollama(ollama::Client),
}

impl ProviderClient {
    /// 根据配置创建客户端；只有兼容OpenAI协议的provider使用自定义base url
    pub fn new(config: &LLMConfig) -> Result<Self> {
        let key = config.api_key.as_str();
        let base_url = config.api_base_url.as_str();

        let client = match config.provider {
            LLMProvider::OpenAI => {
                Self::OpenAI(openai::Client::builder(key).base_url(base_url).build())
            }
            LLMProvider::Moonshot => {
                Self::Moonshot(moonshot::Client::builder(key).base_url(base_url).build())
            }
            LLMProvider::DeepSeek => {
                Self::DeepSeek(deepseek::Client::builder(key).base_url(base_url).build())
            }
            LLMProvider::Mistral => Self::Mistral(mistral::Client::builder(key).build()),
            LLMProvider::OpenRouter => Self::OpenRouter(openrouter::Client::builder(key).build()),
            LLMProvider::Anthropic => {
                Self::Anthropic(anthropic::ClientBuilder::new(key).build()?)
            }
            LLMProvider::Gemini => Self::Gemini(gemini::Client::builder(key).build()?),
            LLMProvider::Ollama => Self::Ollama(ollama::Client::builder().build()),
        };
        Ok(client)
    }

    /// 创建只做单轮文本生成的Agent
    pub fn create_agent(
        &self,
        model: &str,
        system_prompt: &str,
        config: &LLMConfig,
    ) -> Result<ProviderAgent> {
        let spec = AgentSpec {
            model,
            preamble: system_prompt,
            max_tokens: config.max_tokens.into(),
            temperature: config.temperature,
        };

        let agent = match self {
            // 走chat completions接口，兼容自定义base url的OpenAI协议服务
            Self::OpenAI(client) => ProviderAgent::OpenAI(
                client
                    .completion_model(spec.model)
                    .completions_api()
                    .into_agent_builder()
                    .preamble(spec.preamble)
                    .max_tokens(spec.max_tokens)
                    .temperature(spec.temperature)
                    .build(),
            ),
            Self::Moonshot(client) => ProviderAgent::Moonshot(build_agent!(client, spec)),
            Self::DeepSeek(client) => ProviderAgent::DeepSeek(build_agent!(client, spec)),
            Self::Mistral(client) => ProviderAgent::Mistral(build_agent!(client, spec)),
            Self::OpenRouter(client) => ProviderAgent::OpenRouter(build_agent!(client, spec)),
            Self::Anthropic(client) => {
                ProviderAgent::Anthropic(build_agent!(client, spec, max_tokens))
            }
            Self::Ollama(client) => ProviderAgent::Ollama(build_agent!(client, spec, max_tokens)),
            Self::Gemini(client) => {
                let params =
                    AdditionalParameters::default().with_config(GenerationConfig::default());
                ProviderAgent::Gemini(
                    client
                        .agent(spec.model)
                        .preamble(spec.preamble)
                        .max_tokens(spec.max_tokens)
                        .temperature(spec.temperature)
                        .additional_params(serde_json::to_value(params)?)
                        .build(),
                )
            }
        };
        Ok(agent)
    }
}

/// 统一的Agent枚举
pub enum ProviderAgent {
    OpenAI(Agent<openai::CompletionModel>),
    Moonshot(Agent<moonshot::CompletionModel>),
    DeepSeek(Agent<deepseek::CompletionModel>),
    Mistral(Agent<mistral::CompletionModel>),
    OpenRouter(Agent<openrouter::CompletionModel>),
    Anthropic(Agent<anthropic::completion::CompletionModel>),
    Gemini(Agent<gemini::completion::CompletionModel>),
    Ollama(Agent<ollama::CompletionModel<reqwest::Client>>),
}

impl ProviderAgent {
    /// 发送一轮prompt并返回模型的完整回答
    pub async fn prompt(&self, prompt: &str) -> Result<String> {
        dispatch_prompt!(
            self,
            prompt,
            [OpenAI, Moonshot, DeepSeek, Mistral, OpenRouter, Anthropic, Gemini, Ollama]
        )
    }
}
