//! 网页抓取工具，提取页面标题与可读正文

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::PageFetcher;
use crate::config::CrawlerConfig;
use crate::utils::text::{clean_text, truncate_chars};

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title\s*>").expect("valid title regex"));
static NON_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<!--.*?-->|<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>|<head\b.*?</head\s*>",
    )
    .expect("valid non-content regex")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));

/// 抓取错误
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no readable text at {0}")]
    Empty(String),
}

/// 抓取到的页面
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FetchedPage {
    pub title: String,
    pub content: String,
}

/// 基于HTTP的网页抓取器，请求之间加入随机间隔避免给目标站点造成压力
pub struct WebCrawler {
    http: Client,
    config: CrawlerConfig,
}

impl WebCrawler {
    pub fn new(config: &CrawlerConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    async fn politeness_delay(&self) {
        if self.config.max_delay_ms == 0 {
            return;
        }
        let delay_ms =
            rand::rng().random_range(self.config.min_delay_ms..=self.config.max_delay_ms);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.politeness_delay().await;

        let response = self.http.get(url).send().await?.error_for_status()?;
        let html = response.text().await?;

        let page = extract_page(&html, self.config.max_page_chars);
        if page.content.is_empty() {
            return Err(FetchError::Empty(url.to_string()));
        }
        Ok(page)
    }
}

#[async_trait]
impl PageFetcher for WebCrawler {
    async fn fetch(&self, url: &str) -> anyhow::Result<FetchedPage> {
        Ok(self.fetch_page(url).await?)
    }
}

/// 从HTML中提取标题与正文，正文按字符数截断
pub fn extract_page(html: &str, max_chars: usize) -> FetchedPage {
    let title = TITLE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| clean_text(&decode_entities(m.as_str())))
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| "No title found".to_string());

    let body = NON_CONTENT.replace_all(html, " ");
    let body = TAG.replace_all(&body, " ");
    let content = clean_text(&decode_entities(&body));

    FetchedPage {
        title,
        content: truncate_chars(&content, max_chars).to_string(),
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title> Solar Panels &amp; You </title>
  <style>body { color: red; }</style>
</head>
<body>
  <!-- navigation -->
  <script>var tracking = "<p>not content</p>";</script>
  <h1>How   solar works</h1>
  <p>Photovoltaic cells turn&nbsp;light into electricity.</p>
  <noscript>Enable JS</noscript>
</body>
</html>"#;

    #[test]
    fn test_extract_page_title_and_text() {
        let page = extract_page(PAGE, 10_000);

        assert_eq!(page.title, "Solar Panels & You");
        assert_eq!(
            page.content,
            "How solar works Photovoltaic cells turn light into electricity."
        );
    }

    #[test]
    fn test_extract_page_truncates_content() {
        let page = extract_page(PAGE, 9);
        assert_eq!(page.content, "How solar");
    }

    #[test]
    fn test_extract_page_without_title() {
        let page = extract_page("<p>plain body</p>", 100);
        assert_eq!(page.title, "No title found");
        assert_eq!(page.content, "plain body");
    }

    #[test]
    fn test_decode_entities_keeps_escaped_ampersand_literal() {
        assert_eq!(decode_entities("a &amp;lt; b"), "a &lt; b");
    }
}
