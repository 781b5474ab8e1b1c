pub mod draft;
pub mod findings;
pub mod research;
pub mod source;

pub use draft::Draft;
pub use findings::ExtractedFindings;
pub use research::ResearchResult;
pub use source::{SearchHit, SourceRecord};
