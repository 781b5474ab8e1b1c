//! 流水线的五个阶段，每个阶段读取上一阶段写入状态的产出

use anyhow::{Result, anyhow};

use super::{PipelineState, Stage};
use crate::generator::compose::{Critic, Drafter};
use crate::generator::context::GeneratorContext;
use crate::generator::research::Researcher;

pub async fn run_stage(
    context: &GeneratorContext,
    stage: Stage,
    state: &mut PipelineState,
) -> Result<()> {
    match stage {
        Stage::ParseQuery => parse_query(context, state).await,
        Stage::ConductResearch => conduct_research(context, state).await,
        Stage::GenerateDraft => generate_draft(context, state).await,
        Stage::AnalyzeDraft => analyze_draft(context, state).await,
        Stage::RefineAnswer => refine_answer(context, state).await,
    }
}

/// 从原始问题中提炼调研主题
pub async fn extract_topic(context: &GeneratorContext, raw_query: &str) -> Result<String> {
    let prompt = format!(
        r#"Analyze the following research query and extract the main research topic. Return ONLY the topic as a short phrase, without any explanation.

Query: {raw_query}"#
    );
    let topic = context.coordinator_llm.generate(&prompt).await?;
    Ok(topic.trim().to_string())
}

async fn parse_query(context: &GeneratorContext, state: &mut PipelineState) -> Result<()> {
    println!("🎯 提炼调研主题...");
    state.topic = extract_topic(context, &state.raw_query).await?;
    println!("   主题: {}", state.topic);
    Ok(())
}

async fn conduct_research(context: &GeneratorContext, state: &mut PipelineState) -> Result<()> {
    let research = Researcher.research(context, &state.topic).await?;
    state.research_result = Some(research);
    Ok(())
}

async fn generate_draft(context: &GeneratorContext, state: &mut PipelineState) -> Result<()> {
    let research = state
        .research_result
        .as_ref()
        .ok_or_else(|| anyhow!("撰写草稿前缺少调研结果"))?;

    println!("✍️ 撰写答案草稿...");
    let draft = Drafter
        .draft(context, research, &context.config.answer_format)
        .await?;
    state.draft = Some(draft);
    Ok(())
}

async fn analyze_draft(context: &GeneratorContext, state: &mut PipelineState) -> Result<()> {
    let draft = state
        .draft
        .as_ref()
        .ok_or_else(|| anyhow!("评审前缺少草稿"))?;

    println!("🧐 评审草稿...");
    let feedback = Critic.critique(context, draft, &state.topic).await?;
    state.feedback = Some(feedback);
    Ok(())
}

async fn refine_answer(context: &GeneratorContext, state: &mut PipelineState) -> Result<()> {
    let (Some(draft), Some(feedback)) = (state.draft.as_ref(), state.feedback.as_deref()) else {
        return Err(anyhow!("修订前缺少草稿或评审意见"));
    };

    println!("🔧 根据评审意见修订答案...");
    let final_draft = Drafter.revise(context, draft, feedback).await?;
    state.final_draft = Some(final_draft);
    state.complete = true;
    Ok(())
}
