use std::fmt::Write;

use anyhow::Result;

use crate::generator::context::GeneratorContext;
use crate::types::{Draft, ResearchResult};

/// 把调研结果整理成撰写用的Markdown材料
///
/// 同样的输入总是得到同样的文本：摘要和发现为空时整段省略，来源按顺序编号。
pub fn format_research_data(research: &ResearchResult) -> String {
    let mut data = format!("# Research Data on: {}\n\n", research.topic);

    data.push_str("## Search Queries Used\n");
    for query in &research.queries {
        let _ = writeln!(data, "- {}", query);
    }

    if !research.summary.trim().is_empty() {
        let _ = write!(data, "\n## Research Summary\n{}\n", research.summary.trim());
    }

    let findings = &research.extracted;
    if !findings.is_empty() {
        data.push_str("\n## Key Findings\n");
        let sections = [
            ("Main Points", &findings.main_findings),
            ("Important Data", &findings.data_points),
            ("Different Perspectives", &findings.perspectives),
            ("Information Gaps", &findings.information_gaps),
        ];
        for (heading, items) in sections {
            if items.is_empty() {
                continue;
            }
            let _ = writeln!(data, "\n### {}", heading);
            for item in items {
                let _ = writeln!(data, "- {}", item);
            }
        }
    }

    if !research.sources.is_empty() {
        data.push_str("\n## Sources\n");
        for (i, source) in research.sources.iter().enumerate() {
            let title = if source.title.trim().is_empty() {
                "Untitled"
            } else {
                source.title.trim()
            };
            let _ = writeln!(data, "{}. [{}]({})", i + 1, title, source.url);
        }
    }

    data
}

/// 答案撰写智能体
#[derive(Default, Clone)]
pub struct Drafter;

impl Drafter {
    /// 根据调研结果撰写初稿，来源统计直接取自调研结果
    pub async fn draft(
        &self,
        context: &GeneratorContext,
        research: &ResearchResult,
        format: &str,
    ) -> Result<Draft> {
        let research_data = format_research_data(research);
        let prompt = format!(
            r#"You are an expert at drafting comprehensive, well-structured answers from research data.

Using the research data below, write a {format} answer about "{topic}".

{research_data}

Requirements:
1. Start with a clear, direct answer to the research topic
2. Organize the content with logical sections and headings where appropriate
3. Support claims with the findings and data above
4. Acknowledge different perspectives and remaining information gaps
5. Cite the numbered sources where relevant
6. End with a brief conclusion"#,
            topic = research.topic,
        );

        let answer = context.worker_llm.generate(&prompt).await?;

        Ok(Draft {
            topic: research.topic.clone(),
            answer: answer.trim().to_string(),
            format: format.to_string(),
            sources_count: research.sources.len(),
            source_urls: research.source_urls(),
            refined: false,
            feedback: None,
        })
    }

    /// 按评审意见修订草稿，返回新草稿，原草稿保持不变
    pub async fn revise(
        &self,
        context: &GeneratorContext,
        draft: &Draft,
        feedback: &str,
    ) -> Result<Draft> {
        let prompt = format!(
            r#"You are an expert at refining and improving drafted answers.

Original answer about "{topic}":
{answer}

Feedback:
{feedback}

Rewrite the answer in {format} format. Address every point of the feedback while keeping what already works, and keep the source citations."#,
            topic = draft.topic,
            answer = draft.answer,
            format = draft.format,
        );

        let answer = context.worker_llm.generate(&prompt).await?;
        Ok(draft.revised(answer.trim().to_string(), feedback))
    }
}
