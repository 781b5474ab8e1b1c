use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use deepquery::config::Config;
use deepquery::llm::LanguageModel;
use deepquery::tools::WebSearch;
use deepquery::types::SearchHit;
use deepquery::{GeneratorContext, ResearchPipeline, ResearchReport, Stage, launch_pipeline};
use futures::StreamExt;
use tempfile::TempDir;

/// 按prompt开头的指令作答的模型
struct KeywordModel {
    prompts: Mutex<Vec<String>>,
}

impl KeywordModel {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LanguageModel for KeywordModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let reply = if prompt.contains("refining and improving") {
            "# Tidal energy\n\nRevised, with capacity figures."
        } else if prompt.contains("drafting comprehensive") {
            "# Tidal energy\n\nFirst draft."
        } else if prompt.contains("Evaluate this draft") {
            "Mention installed capacity."
        } else if prompt.contains("concise research summary") {
            "Tidal power is predictable."
        } else if prompt.contains("Extract and organize") {
            "```json\n{\"main_findings\": [\"Tides are predictable\"], \"data_points\": [\"240 MW at La Rance\"]}\n```"
        } else if prompt.contains("specific search queries") {
            "Sure! ['tidal energy basics', 'tidal power plants', 'tidal energy cost']"
        } else if prompt.contains("extract the main research topic") {
            "  tidal energy  \n"
        } else {
            return Err(anyhow!("unexpected prompt"));
        };
        Ok(reply.to_string())
    }
}

/// 每个查询返回两条结果，其中一条在所有查询之间共享
struct SharedResultSearch;

#[async_trait]
impl WebSearch for SharedResultSearch {
    async fn search(&self, query: &str, _max_results: usize) -> Result<Vec<SearchHit>> {
        if query == "tidal energy cost" {
            return Err(anyhow!("HTTP 429"));
        }
        Ok(vec![
            SearchHit::new("Shared overview", "https://shared.example", "Overview text"),
            SearchHit::new(
                format!("Article on {}", query),
                format!("https://news.example/{}", query.replace(' ', "-")),
                format!("Details about {}", query),
            ),
        ])
    }
}

fn pipeline_with(config: Config, model: Arc<KeywordModel>) -> ResearchPipeline {
    let context = GeneratorContext::with_collaborators(
        config,
        model.clone(),
        model,
        Arc::new(SharedResultSearch),
    )
    .unwrap();
    ResearchPipeline::from_context(context)
}

fn offline_config(output: &TempDir) -> Config {
    Config {
        output_path: output.path().to_path_buf(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_full_pipeline_with_partial_search_failure() {
    let output = TempDir::new().unwrap();
    let model = KeywordModel::new();
    let pipeline = pipeline_with(offline_config(&output), model.clone());

    let state = pipeline.run("Tell me about tidal energy").await.unwrap();

    assert!(state.complete);
    assert_eq!(state.topic, "tidal energy");

    let research = state.research_result.as_ref().unwrap();
    assert_eq!(
        research.queries,
        vec!["tidal energy basics", "tidal power plants", "tidal energy cost"]
    );
    // The shared url appears once, the failing query contributes nothing
    assert_eq!(research.sources.len(), 3);
    assert_eq!(research.sources[0].url, "https://shared.example");
    assert_eq!(research.sources[0].query, "tidal energy basics");
    assert_eq!(research.extracted.data_points, vec!["240 MW at La Rance"]);
    assert!(research.extracted.perspectives.is_empty());
    assert_eq!(research.summary, "Tidal power is predictable.");

    let final_draft = state.final_draft.as_ref().unwrap();
    assert_eq!(final_draft.sources_count, 3);
    assert!(final_draft.refined);
    assert_eq!(
        final_draft.feedback.as_deref(),
        Some("Mention installed capacity.")
    );

    let draft_prompt = model
        .prompts
        .lock()
        .unwrap()
        .iter()
        .find(|p| p.contains("drafting comprehensive"))
        .cloned()
        .unwrap();
    assert!(draft_prompt.contains("# Research Data on: tidal energy"));
    assert!(draft_prompt.contains("1. [Shared overview](https://shared.example)"));
}

#[tokio::test]
async fn test_stream_reports_every_stage_in_order() {
    let output = TempDir::new().unwrap();
    let pipeline = pipeline_with(offline_config(&output), KeywordModel::new());

    let stages: Vec<Stage> = pipeline
        .stream("Tell me about tidal energy")
        .map(|event| event.unwrap().stage)
        .collect()
        .await;

    assert_eq!(stages, Stage::PIPELINE.to_vec());
}

#[tokio::test]
async fn test_launch_writes_report_files() {
    let output = TempDir::new().unwrap();
    let pipeline = pipeline_with(offline_config(&output), KeywordModel::new());

    let report = launch_pipeline(&pipeline, "Tell me about tidal energy")
        .await
        .unwrap();

    let entries: Vec<_> = std::fs::read_dir(output.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 2);

    let json_path = entries
        .iter()
        .find(|p| p.extension().is_some_and(|ext| ext == "json"))
        .unwrap();
    assert!(
        json_path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("_tidal_energy.json")
    );
    let saved: ResearchReport =
        serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
    assert_eq!(saved, report);
    assert_eq!(saved.query, "Tell me about tidal energy");
    assert_eq!(saved.sources_count, 3);

    let md_path = json_path.with_extension("md");
    assert_eq!(
        std::fs::read_to_string(md_path).unwrap(),
        "# Tidal energy\n\nRevised, with capacity figures."
    );
}
