use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::i18n::TargetLanguage;

/// 默认配置文件名，位于当前工作目录
pub const DEFAULT_CONFIG_FILE: &str = "deepquery.toml";

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "moonshot")]
    Moonshot,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "mistral")]
    Mistral,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "gemini")]
    #[default]
    Gemini,
    #[serde(rename = "ollama")]
    Ollama,
}

impl LLMProvider {
    /// 本地部署的provider不需要API KEY
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, LLMProvider::Ollama)
    }
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Moonshot => write!(f, "moonshot"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::Mistral => write!(f, "mistral"),
            LLMProvider::OpenRouter => write!(f, "openrouter"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Gemini => write!(f, "gemini"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "moonshot" => Ok(LLMProvider::Moonshot),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "mistral" => Ok(LLMProvider::Mistral),
            "openrouter" => Ok(LLMProvider::OpenRouter),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "gemini" => Ok(LLMProvider::Gemini),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// Tavily 检索深度
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    #[default]
    Basic,
    Advanced,
}

impl SearchDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchDepth::Basic => "basic",
            SearchDepth::Advanced => "advanced",
        }
    }
}

impl std::str::FromStr for SearchDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(SearchDepth::Basic),
            "advanced" => Ok(SearchDepth::Advanced),
            _ => Err(format!("Unknown search depth: {}", s)),
        }
    }
}

/// 配置校验错误，在任何阶段运行之前触发
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("missing credential `{0}`, set it in the config file, the environment or on the command line")]
    MissingCredential(&'static str),

    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// 输出路径
    pub output_path: PathBuf,

    /// 目标语言
    pub target_language: TargetLanguage,

    /// 答案格式，原样传给模型（markdown、plain_text等）
    pub answer_format: String,

    /// 每个阶段完成后都把状态快照写入输出目录
    pub persist_snapshots: bool,

    /// 是否启用详细日志
    pub verbose: bool,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 网络检索配置
    pub search: SearchConfig,

    /// 调研阶段配置
    pub research: ResearchConfig,

    /// 网页抓取配置
    pub crawler: CrawlerConfig,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 高能效模型，用于检索规划、信息抽取与答案撰写
    pub model_efficient: String,

    /// 高质量模型，用于主题提炼与草稿评审
    pub model_powerful: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 单次调用的超时时间（秒）
    pub timeout_seconds: u64,
}

/// 网络检索配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Tavily API KEY
    pub api_key: String,

    /// Tavily API基地址
    pub api_base_url: String,

    /// 检索深度
    pub search_depth: SearchDepth,

    /// 单次检索的超时时间（秒）
    pub timeout_seconds: u64,
}

/// 调研阶段配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ResearchConfig {
    /// 生成的检索查询数量
    pub num_queries: usize,

    /// 每个查询请求的结果数量
    pub max_results_per_query: usize,

    /// 信息抽取时每个来源截取的字符数
    pub source_excerpt_chars: usize,

    /// 评审时草稿截取的字符数
    pub critique_excerpt_chars: usize,

    /// 调研摘要的目标字数
    pub summary_words: usize,

    /// 并发检索数量上限
    pub max_parallels: usize,

    /// 去重后是否抓取网页全文替换检索摘要
    pub fetch_full_pages: bool,
}

/// 网页抓取配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CrawlerConfig {
    /// 单次请求超时时间（秒）
    pub timeout_seconds: u64,

    /// 网页正文保留的最大字符数
    pub max_page_chars: usize,

    /// 请求之间的最小间隔（毫秒）
    pub min_delay_ms: u64,

    /// 请求之间的最大间隔（毫秒）
    pub max_delay_ms: u64,

    /// 请求使用的User-Agent
    pub user_agent: String,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 检查配置是否可以用来构建流水线
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.provider.requires_api_key() && self.llm.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential("llm.api_key"));
        }
        if self.search.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential("search.api_key"));
        }
        if self.llm.model_efficient.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "llm.model_efficient",
                reason: "model name must not be empty".to_string(),
            });
        }
        if self.llm.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.timeout_seconds",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.search.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.timeout_seconds",
                reason: "must be greater than zero".to_string(),
            });
        }
        self.research.validate()?;
        self.crawler.validate()
    }
}

impl ResearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("research.num_queries", self.num_queries),
            ("research.max_results_per_query", self.max_results_per_query),
            ("research.max_parallels", self.max_parallels),
        ];
        for (field, value) in counts {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }
}

impl CrawlerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_delay_ms > self.max_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "crawler.min_delay_ms",
                reason: format!(
                    "{} is larger than crawler.max_delay_ms ({})",
                    self.min_delay_ms, self.max_delay_ms
                ),
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("./output"),
            target_language: TargetLanguage::default(),
            answer_format: String::from("markdown"),
            persist_snapshots: false,
            verbose: false,
            llm: LLMConfig::default(),
            search: SearchConfig::default(),
            research: ResearchConfig::default(),
            crawler: CrawlerConfig::default(),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("DEEPQUERY_LLM_API_KEY")
                .or_else(|_| std::env::var("GOOGLE_API_KEY"))
                .unwrap_or_default(),
            api_base_url: String::from("https://generativelanguage.googleapis.com"),
            model_efficient: String::from("gemini-2.5-flash"),
            model_powerful: String::from("gemini-2.5-pro"),
            max_tokens: 8192,
            temperature: 0.2,
            timeout_seconds: 300,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("TAVILY_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api.tavily.com"),
            search_depth: SearchDepth::default(),
            timeout_seconds: 30,
        }
    }
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            num_queries: 3,
            max_results_per_query: 5,
            source_excerpt_chars: 1000,
            critique_excerpt_chars: 2000,
            summary_words: 250,
            max_parallels: 3,
            fetch_full_pages: false,
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            max_page_chars: 10000,
            min_delay_ms: 1000,
            max_delay_ms: 3000,
            user_agent: String::from(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
            ),
        }
    }
}
