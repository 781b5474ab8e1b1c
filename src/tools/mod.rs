//! 外部协作方：网络检索与网页抓取

use anyhow::Result;
use async_trait::async_trait;

use crate::types::SearchHit;

pub mod crawler;
pub mod tavily;

pub use crawler::{FetchedPage, WebCrawler};
pub use tavily::TavilySearch;

/// 文本检索服务：查询进，按相关度排序的结果出
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

/// 网页抓取服务：url进，标题与正文出
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}
