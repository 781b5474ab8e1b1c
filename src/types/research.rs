use serde::{Deserialize, Serialize};

use super::findings::ExtractedFindings;
use super::source::SourceRecord;

/// 调研阶段的产出
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ResearchResult {
    pub topic: String,
    /// 按生成顺序排列的检索查询
    pub queries: Vec<String>,
    /// 按url去重后的来源，保留首次出现的顺序
    pub sources: Vec<SourceRecord>,
    pub extracted: ExtractedFindings,
    /// 调研摘要，没有来源时为空
    pub summary: String,
}

impl ResearchResult {
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            ..Default::default()
        }
    }

    pub fn source_urls(&self) -> Vec<String> {
        self.sources.iter().map(|source| source.url.clone()).collect()
    }
}
