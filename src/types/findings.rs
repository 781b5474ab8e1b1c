use serde::{Deserialize, Serialize};

/// 从来源中抽取出的四类结构化发现
///
/// 所有字段缺省为空序列，模型返回缺字段时不会报错。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ExtractedFindings {
    /// 主要发现
    pub main_findings: Vec<String>,
    /// 关键数据与统计
    pub data_points: Vec<String>,
    /// 不同观点或方法
    pub perspectives: Vec<String>,
    /// 仍需补充的信息缺口
    pub information_gaps: Vec<String>,
}

impl ExtractedFindings {
    pub fn is_empty(&self) -> bool {
        self.main_findings.is_empty()
            && self.data_points.is_empty()
            && self.perspectives.is_empty()
            && self.information_gaps.is_empty()
    }
}
