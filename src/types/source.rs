use serde::{Deserialize, Serialize};

/// 检索服务返回的单条结果
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    /// 检索服务给出的正文摘录
    pub content: String,
}

impl SearchHit {
    pub fn new(title: impl Into<String>, url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
        }
    }
}

/// 一条证据来源，附带产生它的检索查询
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SourceRecord {
    pub title: String,
    /// 同一次调研内唯一
    pub url: String,
    /// 原始正文，可能已被截断
    pub content: String,
    /// 产生该来源的检索查询
    pub query: String,
}

impl SourceRecord {
    pub fn from_hit(hit: SearchHit, query: &str) -> Self {
        Self {
            title: hit.title,
            url: hit.url,
            content: hit.content,
            query: query.to_string(),
        }
    }
}
