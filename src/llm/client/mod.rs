//! LLM客户端 - 基于rig为调研流水线提供统一的文本生成接口

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::LLMConfig;
use crate::i18n::TargetLanguage;
use crate::llm::{LanguageModel, LlmError};

mod providers;

use providers::ProviderClient;

const RESEARCH_ASSISTANT_PREAMBLE: &str = "You are a meticulous research assistant. Follow the requested output format exactly and rely only on the material you are given.";

/// LLM客户端，绑定一个具体模型
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    client: ProviderClient,
    model: String,
    system_prompt: String,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: &LLMConfig, model: &str, language: TargetLanguage) -> Result<Self> {
        let client = ProviderClient::new(config)
            .with_context(|| format!("无法创建 {} 客户端", config.provider))?;
        let system_prompt = format!(
            "{}\n\n{}",
            RESEARCH_ASSISTANT_PREAMBLE,
            language.prompt_instruction()
        );

        Ok(Self {
            config: config.clone(),
            client,
            model: model.to_string(),
            system_prompt,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// 单轮对话（不使用工具），超时视为调用失败
    pub async fn prompt(&self, user_prompt: &str) -> Result<String> {
        let agent = self
            .client
            .create_agent(&self.model, &self.system_prompt, &self.config)?;

        tracing::debug!(
            "调用模型 {}，prompt长度 {} 字符",
            self.model,
            user_prompt.chars().count()
        );

        with_timeout(
            &self.model,
            self.config.timeout_seconds,
            agent.prompt(user_prompt),
        )
        .await
    }
}

/// 为一次模型调用加上超时，超时记为`LlmError::Timeout`
async fn with_timeout<F>(model: &str, seconds: u64, call: F) -> Result<String>
where
    F: Future<Output = Result<String>>,
{
    match tokio::time::timeout(Duration::from_secs(seconds), call).await {
        Ok(result) => result.with_context(|| format!("模型 {} 调用失败", model)),
        Err(_) => Err(LlmError::Timeout {
            model: model.to_string(),
            seconds,
        }
        .into()),
    }
}

#[async_trait]
impl LanguageModel for LLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompt(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_call_that_never_answers_times_out() {
        let err = with_timeout("slow-model", 1, std::future::pending())
            .await
            .unwrap_err();

        match err.downcast_ref::<LlmError>() {
            Some(LlmError::Timeout { model, seconds }) => {
                assert_eq!(model, "slow-model");
                assert_eq!(*seconds, 1);
            }
            None => panic!("expected a timeout, got {:#}", err),
        }
    }

    #[tokio::test]
    async fn test_call_errors_keep_model_context() {
        let err = with_timeout("flaky-model", 5, async { Err(anyhow::anyhow!("503")) })
            .await
            .unwrap_err();

        assert!(err.downcast_ref::<LlmError>().is_none());
        assert!(format!("{:#}", err).contains("flaky-model"));
        assert!(format!("{:#}", err).contains("503"));
    }

    #[tokio::test]
    async fn test_every_provider_builds_an_agent_offline() {
        use crate::config::LLMProvider;

        for provider in [
            LLMProvider::OpenAI,
            LLMProvider::Moonshot,
            LLMProvider::DeepSeek,
            LLMProvider::Mistral,
            LLMProvider::OpenRouter,
            LLMProvider::Anthropic,
            LLMProvider::Gemini,
            LLMProvider::Ollama,
        ] {
            let config = LLMConfig {
                provider,
                api_key: "test-key".to_string(),
                api_base_url: "http://localhost:9".to_string(),
                ..Default::default()
            };
            let client = LLMClient::new(&config, "test-model", TargetLanguage::Chinese).unwrap();

            assert_eq!(client.model(), "test-model");
            assert!(client.system_prompt.contains(RESEARCH_ASSISTANT_PREAMBLE));
            assert!(
                client
                    .client
                    .create_agent(client.model(), &client.system_prompt, &config)
                    .is_ok(),
                "{} agent",
                provider
            );
        }
    }

    #[tokio::test]
    async fn test_answer_within_limit_passes_through() {
        let answer = with_timeout("fast-model", 5, async { Ok("done".to_string()) })
            .await
            .unwrap();

        assert_eq!(answer, "done");
    }
}
