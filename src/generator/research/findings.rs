use anyhow::Result;

use crate::generator::context::GeneratorContext;
use crate::types::{ExtractedFindings, SourceRecord};
use crate::utils::structured_parser::extract;
use crate::utils::text::truncate_chars;

const DIGEST_SEPARATOR: &str = "\n\n---\n\n";

/// 把来源拼成抽取用的摘录，每个来源只保留前`excerpt_chars`个字符
pub fn build_content_digest(sources: &[SourceRecord], excerpt_chars: usize) -> String {
    sources
        .iter()
        .map(|source| {
            let excerpt = truncate_chars(&source.content, excerpt_chars);
            let ellipsis = if excerpt.len() < source.content.len() {
                "..."
            } else {
                ""
            };
            format!(
                "Source: {}\nURL: {}\n{}{}",
                source.title, source.url, excerpt, ellipsis
            )
        })
        .collect::<Vec<_>>()
        .join(DIGEST_SEPARATOR)
}

/// 从来源中抽取四类结构化发现
pub async fn extract_findings(
    context: &GeneratorContext,
    topic: &str,
    sources: &[SourceRecord],
) -> Result<ExtractedFindings> {
    let digest = build_content_digest(sources, context.config.research.source_excerpt_chars);
    let prompt = format!(
        r#"Extract and organize the key information from these sources about: {topic}

{digest}

Respond with a JSON object using exactly these keys:
- "main_findings": the most important findings
- "data_points": key data points and statistics
- "perspectives": different perspectives or approaches
- "information_gaps": information gaps that still need research

Every value must be a list of strings. Return ONLY the JSON object."#
    );

    let response = context.worker_llm.generate(&prompt).await?;
    let findings: ExtractedFindings = extract(&response);
    tracing::debug!(
        "抽取结果: {} 条发现, {} 条数据, {} 个观点, {} 个缺口",
        findings.main_findings.len(),
        findings.data_points.len(),
        findings.perspectives.len(),
        findings.information_gaps.len()
    );
    Ok(findings)
}

/// 基于结构化发现生成调研摘要
pub async fn summarize(
    context: &GeneratorContext,
    topic: &str,
    findings: &ExtractedFindings,
) -> Result<String> {
    let words = context.config.research.summary_words;
    let prompt = format!(
        r#"Write a concise research summary (about {words} words) on: {topic}

Main findings: {main}
Key data points: {data}
Perspectives: {perspectives}
Information gaps: {gaps}

Synthesize the information into a coherent overview."#,
        main = findings.main_findings.join(", "),
        data = findings.data_points.join(", "),
        perspectives = findings.perspectives.join(", "),
        gaps = findings.information_gaps.join(", "),
    );

    let summary = context.worker_llm.generate(&prompt).await?;
    Ok(summary.trim().to_string())
}
