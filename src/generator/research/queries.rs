use anyhow::Result;

use crate::generator::context::GeneratorContext;
use crate::utils::structured_parser::extract;

/// 让模型规划检索查询
///
/// 模型调用失败会向上传播；输出无法解析或解析为空时退化为单个兜底查询。
pub async fn generate_search_queries(
    context: &GeneratorContext,
    topic: &str,
    num_queries: usize,
) -> Result<Vec<String>> {
    let prompt = format!(
        r#"Generate {num_queries} specific search queries to research the following topic thoroughly:

Topic: {topic}

The queries should cover different aspects of the topic and be specific enough to return relevant results.
Return ONLY a list of queries in this format: ["query 1", "query 2", "query 3"]"#
    );

    let response = context.worker_llm.generate(&prompt).await?;
    Ok(plan_queries(&response, topic, num_queries))
}

/// 解析模型输出，保持顺序截取前`num_queries`个非空查询
pub fn plan_queries(response: &str, topic: &str, num_queries: usize) -> Vec<String> {
    let mut queries: Vec<String> = extract::<Vec<String>>(response)
        .into_iter()
        .map(|query| query.trim().to_string())
        .filter(|query| !query.is_empty())
        .collect();
    queries.truncate(num_queries);

    if queries.is_empty() {
        tracing::warn!("无法从模型输出中解析检索查询，使用兜底查询: {}", response);
        return vec![fallback_query(topic)];
    }
    queries
}

pub fn fallback_query(topic: &str) -> String {
    format!("comprehensive information about {}", topic)
}
