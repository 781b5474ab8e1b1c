//! 单元测试使用的脚本化协作方

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::config::Config;
use crate::generator::context::GeneratorContext;
use crate::llm::LanguageModel;
use crate::tools::{FetchedPage, PageFetcher, WebSearch};
use crate::types::SearchHit;

type Responder = Box<dyn Fn(&str) -> Result<String> + Send + Sync>;

/// 按prompt内容作答的模型，记录收到的每个prompt
pub struct ScriptedModel {
    responder: Responder,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(responder: impl Fn(&str) -> Result<String> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// 使用默认剧本作答
    pub fn scripted(script: Script) -> Arc<Self> {
        Self::new(move |prompt| script.respond(prompt))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.responder)(prompt)
    }
}

/// 每类prompt的固定回答
#[derive(Clone)]
pub struct Script {
    pub topic: String,
    pub queries: String,
    pub findings: String,
    pub summary: String,
    pub draft: String,
    pub critique: String,
    pub revision: String,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            topic: "solar panels".to_string(),
            queries: r#"["q1", "q2", "q3"]"#.to_string(),
            findings: r#"{"main_findings": ["Panels convert sunlight"], "data_points": ["22% efficiency"], "perspectives": ["Rooftop vs utility"], "information_gaps": ["Recycling"]}"#.to_string(),
            summary: "Solar panels turn light into electricity.".to_string(),
            draft: "Draft answer about solar panels.".to_string(),
            critique: "Add more statistics.".to_string(),
            revision: "Revised answer about solar panels with statistics.".to_string(),
        }
    }
}

impl Script {
    pub fn respond(&self, prompt: &str) -> Result<String> {
        let reply = if prompt.contains(PromptKind::Revision.marker()) {
            &self.revision
        } else if prompt.contains(PromptKind::Draft.marker()) {
            &self.draft
        } else if prompt.contains(PromptKind::Critique.marker()) {
            &self.critique
        } else if prompt.contains(PromptKind::Summary.marker()) {
            &self.summary
        } else if prompt.contains(PromptKind::Extraction.marker()) {
            &self.findings
        } else if prompt.contains(PromptKind::Queries.marker()) {
            &self.queries
        } else if prompt.contains(PromptKind::Topic.marker()) {
            &self.topic
        } else {
            return Err(anyhow!("unexpected prompt: {}", prompt));
        };
        Ok(reply.clone())
    }
}

/// 各阶段prompt中固定出现的短语
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Topic,
    Queries,
    Extraction,
    Summary,
    Draft,
    Critique,
    Revision,
}

impl PromptKind {
    pub fn marker(&self) -> &'static str {
        match self {
            PromptKind::Topic => "extract the main research topic",
            PromptKind::Queries => "specific search queries",
            PromptKind::Extraction => "Extract and organize the key information",
            PromptKind::Summary => "concise research summary",
            PromptKind::Draft => "drafting comprehensive, well-structured answers",
            PromptKind::Critique => "Evaluate this draft answer",
            PromptKind::Revision => "refining and improving drafted answers",
        }
    }

    pub fn count_in(&self, prompts: &[String]) -> usize {
        prompts.iter().filter(|p| p.contains(self.marker())).count()
    }
}

/// 按查询返回预设结果的检索服务
#[derive(Default)]
pub struct StubSearch {
    results: HashMap<String, std::result::Result<Vec<SearchHit>, String>>,
    calls: Mutex<Vec<String>>,
}

impl StubSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hits(mut self, query: &str, hits: Vec<SearchHit>) -> Self {
        self.results.insert(query.to_string(), Ok(hits));
        self
    }

    pub fn with_failure(mut self, query: &str, message: &str) -> Self {
        self.results
            .insert(query.to_string(), Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearch for StubSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        self.calls.lock().unwrap().push(query.to_string());
        match self.results.get(query) {
            Some(Ok(hits)) => Ok(hits.iter().take(max_results).cloned().collect()),
            Some(Err(message)) => Err(anyhow!(message.clone())),
            None => Ok(Vec::new()),
        }
    }
}

/// 对每个url返回固定正文的抓取服务，`fail_on`中的url会失败
#[derive(Default)]
pub struct StubFetcher {
    pub fail_on: Vec<String>,
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        if self.fail_on.iter().any(|u| u == url) {
            return Err(anyhow!("connection refused: {}", url));
        }
        Ok(FetchedPage {
            title: format!("Page {}", url),
            content: format!("Full text of {}", url),
        })
    }
}

/// 生成一组检索结果，url为`https://{prefix}.example/{n}`
pub fn hits(prefix: &str, count: usize) -> Vec<SearchHit> {
    (0..count)
        .map(|n| {
            SearchHit::new(
                format!("{} result {}", prefix, n),
                format!("https://{}.example/{}", prefix, n),
                format!("Content of {} result {}", prefix, n),
            )
        })
        .collect()
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.llm.api_key = "test-llm-key".to_string();
    config.search.api_key = "test-search-key".to_string();
    config
}

/// 两个角色共用同一个模型的上下文
pub fn context_with(model: Arc<ScriptedModel>, search: Arc<StubSearch>) -> GeneratorContext {
    context_with_config(test_config(), model, search)
}

pub fn context_with_config(
    config: Config,
    model: Arc<ScriptedModel>,
    search: Arc<StubSearch>,
) -> GeneratorContext {
    GeneratorContext::with_collaborators(config, model.clone(), model, search).unwrap()
}
