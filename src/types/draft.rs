use serde::{Deserialize, Serialize};

/// 答案草稿
///
/// 修订会生成一个新的`Draft`，`refined`与`feedback`只出现在修订版上。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Draft {
    pub topic: String,
    pub answer: String,
    pub format: String,
    /// 由调研结果直接计算，不解析模型输出
    pub sources_count: usize,
    pub source_urls: Vec<String>,
    #[serde(default)]
    pub refined: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl Draft {
    /// 基于当前草稿生成修订版，自身保持不变
    pub fn revised(&self, answer: String, feedback: &str) -> Self {
        Self {
            answer,
            refined: true,
            feedback: Some(feedback.to_string()),
            ..self.clone()
        }
    }
}
