use anyhow::Result;

use crate::generator::context::GeneratorContext;
use crate::types::Draft;
use crate::utils::text::truncate_chars;

/// 草稿评审智能体，使用高质量模型
#[derive(Default, Clone)]
pub struct Critic;

impl Critic {
    /// 返回模型给出的评审意见原文
    pub async fn critique(
        &self,
        context: &GeneratorContext,
        draft: &Draft,
        topic: &str,
    ) -> Result<String> {
        let limit = context.config.research.critique_excerpt_chars;
        let excerpt = truncate_chars(&draft.answer, limit);
        let marker = if excerpt.len() < draft.answer.len() {
            "... [truncated]"
        } else {
            ""
        };

        let prompt = format!(
            r#"Evaluate this draft answer about "{topic}":

{excerpt}{marker}

Provide specific feedback on:
1. Accuracy and factual correctness
2. Comprehensiveness and coverage
3. Structure and clarity
4. Missing information or perspectives
5. Specific suggestions for improvement"#
        );

        context.coordinator_llm.generate(&prompt).await
    }
}
