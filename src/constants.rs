//! Global Constants
//!
//! Centralized defaults for configuration and tuning.

/// Text splitting and large-file thresholds
pub mod analysis {
    /// Default maximum chunk length in characters
    pub const DEFAULT_CHUNK_SIZE: usize = 2000;

    /// Default overlap between consecutive chunks in characters
    pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

    /// Files splitting into more chunks than this take the large-file path
    pub const DEFAULT_MAX_CHUNKS: usize = 10;

    /// Fragments retrieved per context query
    pub const DEFAULT_CONTEXT_K: usize = 3;

    /// Token budget for a single reduce prompt in map-reduce summaries
    pub const DEFAULT_REDUCE_TOKEN_MAX: usize = 3000;

    /// Maximum collapse rounds before reducing whatever remains
    pub const MAX_COLLAPSE_ROUNDS: usize = 3;

    /// Folder that is never documented itself (its subfolders still are)
    pub const TEST_SOURCE_FOLDER: &str = "src/test";

    /// Directory always pruned from the walk
    pub const GIT_DIR: &str = ".git";
}

/// Context manager seeds
pub mod context {
    /// Fragment the similarity index starts with
    pub const SEED_FRAGMENT: &str = "Initial context";

    /// Running summary before any unit is analyzed
    pub const INITIAL_SUMMARY: &str = "Initial project context.";

    /// Default dimensions for the local hashing embedder
    pub const DEFAULT_HASHING_DIMENSIONS: usize = 384;
}

/// Persisted progress layout
pub mod storage {
    /// Documentation store (relative path -> documentation)
    pub const DOCUMENTATION_FILE: &str = "documentation.json";

    /// Context state (similarity index + running summary)
    pub const CONTEXT_STATE_FILE: &str = "context_state.json";

    /// Final project overview
    pub const PROJECT_SUMMARY_FILE: &str = "project_summary.md";

    /// Default markdown export target
    pub const DEFAULT_MARKDOWN_OUTPUT: &str = "output.md";

    /// Current context state format version
    pub const STATE_VERSION: u32 = 1;
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
}
