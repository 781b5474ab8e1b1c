use std::fmt::{Display, Formatter};
use std::pin::pin;
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use futures::{Stream, StreamExt, stream};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::generator::context::GeneratorContext;
use crate::generator::outlet::{DiskOutlet, Outlet, ResearchReport, run_stamp};
use crate::types::{Draft, ResearchResult};

pub mod stages;
pub mod timing;

pub use timing::TimingScope;

/// 流水线阶段，按声明顺序依次执行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ParseQuery,
    ConductResearch,
    GenerateDraft,
    AnalyzeDraft,
    RefineAnswer,
}

impl Stage {
    pub const PIPELINE: [Stage; 5] = [
        Stage::ParseQuery,
        Stage::ConductResearch,
        Stage::GenerateDraft,
        Stage::AnalyzeDraft,
        Stage::RefineAnswer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ParseQuery => "parse_query",
            Stage::ConductResearch => "conduct_research",
            Stage::GenerateDraft => "generate_draft",
            Stage::AnalyzeDraft => "analyze_draft",
            Stage::RefineAnswer => "refine_answer",
        }
    }

    /// 阶段的中文名称，用于进度输出
    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::ParseQuery => "提炼主题",
            Stage::ConductResearch => "网络调研",
            Stage::GenerateDraft => "撰写草稿",
            Stage::AnalyzeDraft => "评审草稿",
            Stage::RefineAnswer => "修订答案",
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 在各阶段之间传递的流水线状态
///
/// 每个阶段只写入自己负责的字段；`complete`只有最后一个阶段成功后才会置位。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PipelineState {
    pub raw_query: String,
    pub topic: String,
    pub research_result: Option<ResearchResult>,
    pub draft: Option<Draft>,
    pub feedback: Option<String>,
    pub final_draft: Option<Draft>,
    /// 最近一个完成的阶段
    pub current_stage: Option<Stage>,
    pub complete: bool,
}

impl PipelineState {
    pub fn new(raw_query: &str) -> Self {
        Self {
            raw_query: raw_query.to_string(),
            ..Default::default()
        }
    }

    pub fn final_answer(&self) -> Option<&str> {
        self.final_draft.as_ref().map(|draft| draft.answer.as_str())
    }
}

/// 单个阶段完成后产出的事件，携带该时刻的完整状态快照
#[derive(Debug, Clone)]
pub struct StageEvent {
    pub stage: Stage,
    pub elapsed: Duration,
    pub state: PipelineState,
}

/// 调研流水线：提炼主题 → 调研 → 撰写 → 评审 → 修订
pub struct ResearchPipeline {
    context: GeneratorContext,
}

impl ResearchPipeline {
    /// 校验配置并创建真实的协作方
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self::from_context(GeneratorContext::new(config)?))
    }

    pub fn from_context(context: GeneratorContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &GeneratorContext {
        &self.context
    }

    /// 逐阶段执行，每完成一个阶段产出一个事件
    ///
    /// 任一阶段失败时产出该错误并结束，不会继续执行后续阶段。
    pub fn stream<'a>(
        &'a self,
        raw_query: &str,
    ) -> impl Stream<Item = Result<StageEvent>> + 'a {
        let seed = Some((0usize, PipelineState::new(raw_query)));

        stream::unfold(seed, move |cursor| async move {
            let Some((index, mut state)) = cursor else {
                return None;
            };
            let Some(&stage) = Stage::PIPELINE.get(index) else {
                return None;
            };

            let started = Instant::now();
            match stages::run_stage(&self.context, stage, &mut state).await {
                Ok(()) => {
                    state.current_stage = Some(stage);
                    let event = StageEvent {
                        stage,
                        elapsed: started.elapsed(),
                        state: state.clone(),
                    };
                    Some((Ok(event), Some((index + 1, state))))
                }
                Err(e) => {
                    tracing::error!("阶段 {} 执行失败: {:#}", stage, e);
                    Some((Err(e.context(format!("stage `{}` failed", stage))), None))
                }
            }
        })
    }

    /// 执行全部阶段并返回最终状态
    pub async fn run(&self, raw_query: &str) -> Result<PipelineState> {
        let mut events = pin!(self.stream(raw_query));
        let mut last_state = None;
        while let Some(event) = events.next().await {
            last_state = Some(event?.state);
        }
        last_state.ok_or_else(|| anyhow!("流水线没有执行任何阶段"))
    }
}

/// 使用真实协作方执行一次完整调研并返回最终状态
pub async fn run_pipeline(config: &Config, raw_query: &str) -> Result<PipelineState> {
    ResearchPipeline::new(config.clone())?.run(raw_query).await
}

/// 启动调研工作流：执行、保存结果并打印总结
pub async fn launch(config: &Config, raw_query: &str) -> Result<ResearchReport> {
    let pipeline = ResearchPipeline::new(config.clone())?;
    launch_pipeline(&pipeline, raw_query).await
}

/// 使用已创建的流水线执行调研，结果写入配置中的输出目录
pub async fn launch_pipeline(pipeline: &ResearchPipeline, raw_query: &str) -> Result<ResearchReport> {
    let config = &pipeline.context().config;
    let outlet = DiskOutlet::new(&config.output_path);
    let stamp = run_stamp();
    let mut timing = TimingScope::new();

    println!("🚀 开始调研: {}", raw_query.trim());

    let mut events = pin!(pipeline.stream(raw_query));
    let mut final_state = None;
    while let Some(event) = events.next().await {
        let event = event?;
        timing.record(event.stage.as_str(), event.elapsed);
        println!(
            "✓ {} 完成 ({:.2}秒)",
            event.stage.display_name(),
            event.elapsed.as_secs_f64()
        );

        if config.persist_snapshots {
            if let Err(e) = outlet.save_snapshot(&stamp, &event).await {
                eprintln!("⚠️ 保存阶段快照失败: {:#}", e);
            }
        }
        final_state = Some(event.state);
    }

    let state = final_state.ok_or_else(|| anyhow!("流水线没有执行任何阶段"))?;
    let report = ResearchReport::from_state(&state)?;
    let saved = outlet.save(&stamp, &report).await?;

    println!("\n🎉 调研完成");
    println!("📌 主题: {}", report.topic);
    println!("📚 分析来源: {}", report.sources_count);
    println!("💾 JSON结果: {}", saved.json_path.display());
    println!("💾 Markdown答案: {}", saved.markdown_path.display());
    println!("\n{}", timing.generate_timing_report());

    Ok(report)
}
