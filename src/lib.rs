pub mod cli;
pub mod config;
pub mod generator;
pub mod i18n;
pub mod llm;
pub mod tools;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use generator::context::GeneratorContext;
pub use generator::outlet::ResearchReport;
pub use generator::workflow::{
    PipelineState, ResearchPipeline, Stage, StageEvent, launch, launch_pipeline, run_pipeline,
};
