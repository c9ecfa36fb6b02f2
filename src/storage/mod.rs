//! Persistence Layer
//!
//! - `DocumentationStore`: ordered path → documentation mapping
//! - `ProgressStore`: save-directory handle with atomic file replacement

pub mod documentation;
pub mod progress;

pub use documentation::DocumentationStore;
pub use progress::ProgressStore;
