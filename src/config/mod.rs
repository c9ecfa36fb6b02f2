//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/autodoc/config.toml)
//! 3. Project config (.autodoc/config.toml or `--config`)
//! 4. Environment variables (AUTODOC_*)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::{ConfigLoader, normalize_legacy};
pub use types::*;
