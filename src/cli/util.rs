//! CLI Common Utilities
//!
//! Shared configuration and persistence setup for CLI commands.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;

use crate::ai::{LlmClient, ProviderConfig, create_provider, create_shared_metrics};
use crate::config::{Config, ConfigLoader};
use crate::storage::ProgressStore;
use crate::types::Result;

/// Command execution context
///
/// Resolved configuration plus the save directory every command works on.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
    pub save_dir: PathBuf,
}

impl CommandContext {
    /// Load validated configuration, for commands that call a model
    pub fn load(config_path: Option<&Path>, save_dir: Option<PathBuf>) -> Result<Self> {
        Ok(Self::from_config(ConfigLoader::load(config_path)?, save_dir))
    }

    /// Load configuration without validation, for commands that only
    /// touch saved progress
    pub fn load_for_progress(config_path: Option<&Path>, save_dir: Option<PathBuf>) -> Result<Self> {
        Ok(Self::from_config(
            ConfigLoader::load_unvalidated(config_path)?,
            save_dir,
        ))
    }

    /// `save_dir` overrides `output.save_dir`
    pub fn from_config(mut config: Config, save_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = save_dir {
            config.output.save_dir = dir;
        }
        let save_dir = config.output.save_dir.clone();
        Self { config, save_dir }
    }

    pub fn progress_store(&self) -> ProgressStore {
        ProgressStore::new(&self.save_dir)
    }

    /// Model client for the configured provider with fresh run metrics
    pub fn build_client(&self, session_id: &str) -> Result<LlmClient> {
        let provider = create_provider(&ProviderConfig::from(&self.config.llm))?;
        Ok(LlmClient::new(
            provider,
            create_shared_metrics(session_id),
            Duration::from_secs(self.config.llm.timeout_secs),
        ))
    }
}

/// Save directory holding progress to resume from, if any.
///
/// `save_dir` is the command's override; otherwise config decides.
pub fn resumable_save_dir(config_path: Option<&Path>, save_dir: Option<PathBuf>) -> Option<PathBuf> {
    let ctx = match save_dir {
        Some(dir) => CommandContext::from_config(Config::default(), Some(dir)),
        None => CommandContext::load_for_progress(config_path, None).ok()?,
    };
    ctx.progress_store().has_progress().then_some(ctx.save_dir)
}

/// Identifier for one CLI run
pub fn session_id() -> String {
    format!("run-{}", Utc::now().format("%Y%m%d-%H%M%S"))
}

/// First `max_chars` characters of `text` on one line
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}
