use std::collections::HashSet;
use std::time::Duration;

use futures::{StreamExt, stream};

use crate::generator::context::GeneratorContext;
use crate::tools::{PageFetcher, WebSearch};
use crate::types::SourceRecord;

/// 对所有查询并发检索，合并后按url去重
///
/// 并发度受`research.max_parallels`限制，合并顺序与查询顺序一致。
pub async fn gather_sources(context: &GeneratorContext, queries: &[String]) -> Vec<SourceRecord> {
    let settings = &context.config.research;
    let timeout = Duration::from_secs(context.config.search.timeout_seconds);
    let search = context.search.as_ref();

    let batches: Vec<Vec<SourceRecord>> = stream::iter(queries)
        .map(|query| search_one(search, query, settings.max_results_per_query, timeout))
        .buffered(settings.max_parallels.max(1))
        .collect()
        .await;

    dedup_by_url(batches)
}

/// 单个查询的检索，失败或超时都只记录日志并返回空结果
async fn search_one(
    search: &dyn WebSearch,
    query: &str,
    max_results: usize,
    timeout: Duration,
) -> Vec<SourceRecord> {
    match tokio::time::timeout(timeout, search.search(query, max_results)).await {
        Ok(Ok(hits)) => {
            tracing::debug!("查询 `{}` 返回 {} 条结果", query, hits.len());
            hits.into_iter()
                .take(max_results)
                .map(|hit| SourceRecord::from_hit(hit, query))
                .collect()
        }
        Ok(Err(e)) => {
            tracing::warn!("查询 `{}` 检索失败: {:#}", query, e);
            Vec::new()
        }
        Err(_) => {
            tracing::warn!("查询 `{}` 检索超时（{}秒）", query, timeout.as_secs());
            Vec::new()
        }
    }
}

/// 按url去重，保留每个url首次出现的记录
pub fn dedup_by_url(batches: impl IntoIterator<Item = Vec<SourceRecord>>) -> Vec<SourceRecord> {
    let mut seen = HashSet::new();
    batches
        .into_iter()
        .flatten()
        .filter(|source| seen.insert(source.url.clone()))
        .collect()
}

/// 用网页全文替换检索摘录，逐个抓取，失败的来源保留原摘录
pub async fn enrich_with_pages(fetcher: &dyn PageFetcher, sources: &mut [SourceRecord]) {
    for source in sources.iter_mut() {
        match fetcher.fetch(&source.url).await {
            Ok(page) => {
                source.content = page.content;
                if source.title.trim().is_empty() {
                    source.title = page.title;
                }
            }
            Err(e) => tracing::warn!("抓取 {} 失败，保留检索摘录: {:#}", source.url, e),
        }
    }
}
