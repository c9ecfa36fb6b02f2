//! Documentation Pipeline
//!
//! - `CodebaseAnalyzer`: resumable walk that documents folders and files
//! - `Summarizer`: map-reduce summaries for files too large to document chunk by chunk

pub mod analyzer;
pub mod summarize;

pub use analyzer::{CodebaseAnalyzer, ProjectDocumentation, UnitCallback};
pub use summarize::Summarizer;
