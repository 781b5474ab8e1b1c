//! 调研阶段：规划检索查询、并发检索、按url去重、抽取结构化发现并生成摘要

use anyhow::Result;

use crate::generator::context::GeneratorContext;
use crate::types::ResearchResult;

pub mod findings;
pub mod queries;
pub mod sources;

pub use findings::{build_content_digest, extract_findings, summarize};
pub use queries::generate_search_queries;
pub use sources::{dedup_by_url, enrich_with_pages, gather_sources};

/// 调研智能体
#[derive(Default, Clone)]
pub struct Researcher;

impl Researcher {
    /// 围绕主题完成一次完整调研
    ///
    /// 检索失败只会让对应查询贡献零个来源；没有任何来源时跳过抽取与摘要。
    pub async fn research(&self, context: &GeneratorContext, topic: &str) -> Result<ResearchResult> {
        let settings = &context.config.research;
        let mut result = ResearchResult::new(topic);

        println!("🔍 规划检索查询...");
        result.queries = generate_search_queries(context, topic, settings.num_queries).await?;
        for (i, query) in result.queries.iter().enumerate() {
            println!("   {}. {}", i + 1, query);
        }

        println!("🌐 并发检索中（最多{}路）...", settings.max_parallels);
        let mut sources = gather_sources(context, &result.queries).await;

        if let Some(fetcher) = &context.fetcher {
            if !sources.is_empty() {
                println!("📄 抓取{}个来源的网页全文...", sources.len());
                enrich_with_pages(fetcher.as_ref(), &mut sources).await;
            }
        }
        result.sources = sources;
        println!("📚 共获得 {} 个去重后的来源", result.sources.len());

        if result.sources.is_empty() {
            tracing::warn!("主题 `{}` 没有检索到任何来源，跳过信息抽取", topic);
            return Ok(result);
        }

        println!("🧩 抽取关键信息...");
        result.extracted = extract_findings(context, topic, &result.sources).await?;

        if !result.extracted.is_empty() {
            println!("📝 生成调研摘要...");
            result.summary = summarize(context, topic, &result.extracted).await?;
        }

        Ok(result)
    }
}
