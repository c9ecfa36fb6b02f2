//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! The configuration is immutable for the duration of a run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ai::prompt::{PromptConfig, PromptTemplates};
use crate::constants::{analysis, context, network};
use crate::types::{AutodocError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Repository walk and chunking settings
    pub analysis: AnalysisConfig,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Embedding backend for context retrieval
    pub embedding: EmbeddingConfig,

    /// Prompt templates
    pub prompts: PromptConfig,

    /// Where progress and results are written
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            analysis: AnalysisConfig::default(),
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            prompts: PromptConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `AutodocError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.analysis.file_extensions.is_empty() {
            return Err(AutodocError::Config(
                "analysis.file_extensions must list at least one suffix (e.g. [\".rs\"])"
                    .to_string(),
            ));
        }

        if self
            .analysis
            .file_extensions
            .iter()
            .any(|ext| ext.trim().is_empty())
        {
            return Err(AutodocError::Config(
                "analysis.file_extensions must not contain empty entries".to_string(),
            ));
        }

        if self.analysis.chunk_size == 0 {
            return Err(AutodocError::Config(
                "analysis.chunk_size must be greater than 0".to_string(),
            ));
        }

        if self.analysis.chunk_overlap >= self.analysis.chunk_size {
            return Err(AutodocError::Config(format!(
                "analysis.chunk_overlap ({}) must be smaller than analysis.chunk_size ({})",
                self.analysis.chunk_overlap, self.analysis.chunk_size
            )));
        }

        if self.analysis.context_k == 0 {
            return Err(AutodocError::Config(
                "analysis.context_k must be greater than 0".to_string(),
            ));
        }

        if self.analysis.reduce_token_max == 0 {
            return Err(AutodocError::Config(
                "analysis.reduce_token_max must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(AutodocError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(AutodocError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(AutodocError::Config(
                "embedding.dimensions must be greater than 0".to_string(),
            ));
        }

        PromptTemplates::from_config(&self.prompts)?;

        Ok(())
    }
}

// =============================================================================
// Analysis Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// File name suffixes that select files for documentation
    pub file_extensions: Vec<String>,

    /// Folders whose relative path contains any of these are pruned
    pub skip_folders: Vec<String>,

    /// Maximum chunk length in characters
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,

    /// Chunk count above which the large-file path is used
    pub max_chunks: usize,

    /// Fragments retrieved per context query
    pub context_k: usize,

    /// Token budget of a single reduce prompt
    pub reduce_token_max: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            file_extensions: Vec::new(),
            skip_folders: Vec::new(),
            chunk_size: analysis::DEFAULT_CHUNK_SIZE,
            chunk_overlap: analysis::DEFAULT_CHUNK_OVERLAP,
            max_chunks: analysis::DEFAULT_MAX_CHUNKS,
            context_k: analysis::DEFAULT_CONTEXT_K,
            reduce_token_max: analysis::DEFAULT_REDUCE_TOKEN_MAX,
        }
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider type: "ollama", "openai", "claude-code"
    pub provider: String,
    /// Model name (provider-specific)
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Temperature for generation
    pub temperature: f32,
    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,
    /// API key; never serialized to output
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: usize,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "qwen:7b".to_string(),
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.0,
            api_base: None,
            api_key: None,
            max_tokens: 4096,
        }
    }
}

// =============================================================================
// Embedding Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// "hashing" (local, default) or "ollama"
    pub provider: String,
    /// Embedding model for remote providers
    pub model: String,
    /// Vector size of the hashing embedder
    pub dimensions: usize,
    /// API base URL for remote providers
    pub api_base: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "hashing".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: context::DEFAULT_HASHING_DIMENSIONS,
            api_base: None,
        }
    }
}

// =============================================================================
// Output Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory holding documentation.json and context_state.json
    pub save_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from(".autodoc/doc"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        let mut config = Config::default();
        config.analysis.file_extensions = vec![".rs".to_string()];
        config
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.analysis.chunk_size, 2000);
        assert_eq!(config.analysis.chunk_overlap, 200);
        assert_eq!(config.analysis.max_chunks, 10);
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.embedding.provider, "hashing");
    }

    #[test]
    fn test_validate_requires_extensions() {
        let err = Config::default().validate().unwrap_err();
        assert!(err.to_string().contains("file_extensions"));
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validate_overlap_smaller_than_chunk() {
        let mut config = valid();
        config.analysis.chunk_overlap = config.analysis.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_prompts() {
        let mut config = valid();
        config.prompts.folder = "Describe {folder_path} using {summary}".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("summary"));
    }

    #[test]
    fn test_api_key_redacted_and_not_serialized() {
        let mut config = valid();
        config.llm.api_key = Some("sk-secret".to_string());
        assert!(!format!("{:?}", config.llm).contains("sk-secret"));
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}
