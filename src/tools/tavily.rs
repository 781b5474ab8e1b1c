//! Tavily 网络检索客户端

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::WebSearch;
use crate::config::{SearchConfig, SearchDepth};
use crate::types::SearchHit;

/// 检索错误
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    search_depth: &'static str,
    max_results: usize,
    include_answer: bool,
    include_raw_content: bool,
    include_images: bool,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilyResponse {
    fn into_hits(self) -> Vec<SearchHit> {
        self.results
            .into_iter()
            .map(|result| SearchHit::new(result.title, result.url, result.content))
            .collect()
    }
}

/// 基于Tavily API的检索服务
pub struct TavilySearch {
    http: Client,
    api_key: String,
    endpoint: String,
    search_depth: SearchDepth,
}

impl TavilySearch {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            endpoint: format!("{}/search", config.api_base_url.trim_end_matches('/')),
            search_depth: config.search_depth,
        })
    }

    async fn send_request(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let body = TavilyRequest {
            query,
            search_depth: self.search_depth.as_str(),
            max_results,
            include_answer: false,
            include_raw_content: false,
            include_images: false,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: TavilyResponse = response.json().await?;
        Ok(parsed.into_hits())
    }
}

#[async_trait]
impl WebSearch for TavilySearch {
    async fn search(&self, query: &str, max_results: usize) -> anyhow::Result<Vec<SearchHit>> {
        let hits = self.send_request(query, max_results).await?;
        tracing::debug!("Tavily检索 `{}` 返回 {} 条结果", query, hits.len());
        Ok(hits)
    }
}
