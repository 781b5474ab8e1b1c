//! 结果存储：把完成的调研写入输出目录

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::generator::workflow::{PipelineState, StageEvent};
use crate::utils::text::slugify;

const SLUG_MAX_CHARS: usize = 30;

/// 本次运行的时间戳，作为输出文件名前缀
pub fn run_stamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// 一次完成的调研
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchReport {
    pub query: String,
    pub topic: String,
    pub final_answer: String,
    pub format: String,
    pub sources_count: usize,
    pub source_urls: Vec<String>,
    pub refined: bool,
    pub feedback: Option<String>,
    pub generated_at: DateTime<Utc>,
    /// 完整的流水线状态
    pub state: PipelineState,
}

impl ResearchReport {
    /// 只接受已经完成全部阶段的状态
    pub fn from_state(state: &PipelineState) -> Result<Self> {
        let final_draft = match (&state.final_draft, state.complete) {
            (Some(draft), true) => draft,
            _ => return Err(anyhow!("流水线尚未完成，无法生成调研报告")),
        };

        Ok(Self {
            query: state.raw_query.clone(),
            topic: state.topic.clone(),
            final_answer: final_draft.answer.clone(),
            format: final_draft.format.clone(),
            sources_count: final_draft.sources_count,
            source_urls: final_draft.source_urls.clone(),
            refined: final_draft.refined,
            feedback: final_draft.feedback.clone(),
            generated_at: Utc::now(),
            state: state.clone(),
        })
    }
}

/// 已写入磁盘的文件
#[derive(Debug, Clone, PartialEq)]
pub struct SavedReport {
    pub json_path: PathBuf,
    pub markdown_path: PathBuf,
}

pub trait Outlet {
    async fn save(&self, stamp: &str, report: &ResearchReport) -> Result<SavedReport>;
}

pub struct DiskOutlet {
    output_dir: PathBuf,
}

impl DiskOutlet {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }

    fn file_stem(stamp: &str, topic: &str) -> String {
        format!("{}_{}", stamp, slugify(topic, SLUG_MAX_CHARS))
    }

    async fn ensure_output_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("无法创建输出目录 {}", self.output_dir.display()))
    }

    /// 写入单个阶段完成时的状态快照
    pub async fn save_snapshot(&self, stamp: &str, event: &StageEvent) -> Result<PathBuf> {
        self.ensure_output_dir().await?;

        let label = if event.state.topic.is_empty() {
            &event.state.raw_query
        } else {
            &event.state.topic
        };
        let path = self.output_dir.join(format!(
            "{}.{}.json",
            Self::file_stem(stamp, label),
            event.stage
        ));
        let json = serde_json::to_string_pretty(&event.state)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("无法写入快照 {}", path.display()))?;

        tracing::debug!("已保存阶段快照: {}", path.display());
        Ok(path)
    }
}

impl Outlet for DiskOutlet {
    async fn save(&self, stamp: &str, report: &ResearchReport) -> Result<SavedReport> {
        println!("\n🖊️ 结果存储中...");
        self.ensure_output_dir().await?;

        let stem = Self::file_stem(stamp, &report.topic);
        let json_path = self.output_dir.join(format!("{}.json", stem));
        let markdown_path = self.output_dir.join(format!("{}.md", stem));

        let json = serde_json::to_string_pretty(report)?;
        tokio::fs::write(&json_path, json)
            .await
            .with_context(|| format!("无法写入 {}", json_path.display()))?;
        tokio::fs::write(&markdown_path, &report.final_answer)
            .await
            .with_context(|| format!("无法写入 {}", markdown_path.display()))?;

        Ok(SavedReport {
            json_path,
            markdown_path,
        })
    }
}

// Include tests
#[cfg(test)]
mod tests;
