//! Repository Analysis Primitives
//!
//! - Repository walk with subtree pruning
//! - Recursive character chunking of file content

pub mod chunker;
pub mod scanner;

pub use chunker::TextSplitter;
pub use scanner::{FolderEntry, RepositoryScanner, relative_key};
