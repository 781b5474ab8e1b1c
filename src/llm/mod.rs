//! 语言模型协作方

use anyhow::Result;
use async_trait::async_trait;

pub mod client;

pub use client::LLMClient;

/// 生成式语言模型：prompt进，自由文本出
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// 模型调用错误
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("model `{model}` did not answer within {seconds}s")]
    Timeout { model: String, seconds: u64 },
}
