//! Documentation export formats

pub mod markdown;

pub use markdown::MarkdownExporter;
