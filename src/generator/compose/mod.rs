//! 撰写阶段：草稿撰写、评审与修订

pub mod critic;
pub mod drafter;

pub use critic::Critic;
pub use drafter::{Drafter, format_research_data};
