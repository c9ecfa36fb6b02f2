//! LLM Provider Abstraction
//!
//! Defines the `LlmProvider` trait: one formatted prompt in, one generated
//! text out. All providers return `LlmResponse` with token usage metrics.
//!
//! `LlmClient` wraps a shared provider with the per-request timeout and the
//! run's metrics collector; pipeline code talks to the client only.

mod claude_code;
mod ollama;
mod openai;

pub use claude_code::ClaudeCodeProvider;
pub use ollama::OllamaProvider;
pub(crate) use ollama::{DEFAULT_API_BASE as DEFAULT_OLLAMA_API_BASE, validate_endpoint};
pub use openai::OpenAiProvider;

// Re-export error types from centralized location
pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::ai::metrics::SharedMetrics;
use crate::ai::timeout::with_timeout;
use crate::config::LlmConfig;
use crate::types::{AutodocError, Result};

// =============================================================================
// LLM Response with Usage Metrics
// =============================================================================

/// Complete LLM response including content and usage metrics
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text
    pub content: String,
    /// Token usage metrics
    pub usage: TokenUsage,
    /// Response timing
    pub timing: ResponseTiming,
    /// Provider and model info
    pub metadata: ResponseMetadata,
}

impl LlmResponse {
    /// Create response with content only (usage unknown)
    pub fn content_only(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: TokenUsage::default(),
            timing: ResponseTiming::default(),
            metadata: ResponseMetadata::default(),
        }
    }

    pub fn with_metrics(
        content: String,
        usage: TokenUsage,
        timing: ResponseTiming,
        metadata: ResponseMetadata,
    ) -> Self {
        Self {
            content,
            usage,
            timing,
            metadata,
        }
    }
}

/// Token usage metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens (prompt)
    pub input_tokens: u32,
    /// Output tokens (response)
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Total tokens used (input + output)
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }

    /// Create from OpenAI-style usage response
    pub fn from_openai(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            input_tokens: prompt_tokens,
            output_tokens: completion_tokens,
        }
    }

    /// Create from Ollama-style usage response
    pub fn from_ollama(prompt_eval_count: u32, eval_count: u32) -> Self {
        Self {
            input_tokens: prompt_eval_count,
            output_tokens: eval_count,
        }
    }
}

/// Response timing metrics
#[derive(Debug, Clone, Default)]
pub struct ResponseTiming {
    /// Total response time in milliseconds (wall clock)
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

/// Response metadata
#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    pub model: String,
    pub provider: String,
}

/// Shared LLM provider handle.
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for LLM providers
///
/// API keys are never serialized and are redacted in debug output. Each
/// provider converts the key to `SecretString` internally.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type: "ollama", "openai", "claude-code"
    pub provider: String,
    /// Model name (provider-specific)
    pub model: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Temperature for LLM generation
    pub temperature: f32,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_base: Option<String>,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

fn default_max_tokens() -> usize {
    4096
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: None,
            timeout_secs: 300,
            temperature: 0.0,
            api_key: None,
            api_base: None,
            max_tokens: 4096,
        }
    }
}

impl From<&LlmConfig> for ProviderConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            provider: config.provider.clone(),
            model: Some(config.model.clone()).filter(|m| !m.is_empty()),
            timeout_secs: config.timeout_secs,
            temperature: config.temperature,
            api_key: config.api_key.clone(),
            api_base: config.api_base.clone(),
            max_tokens: config.max_tokens,
        }
    }
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// Text-generation backend
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate text for a single formatted prompt
    async fn generate(&self, prompt: &str) -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Check if the provider is available
    async fn health_check(&self) -> Result<bool>;
}

/// Create a shared provider from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "ollama" => Ok(Arc::new(OllamaProvider::new(config.clone())?)),
        "openai" => Ok(Arc::new(OpenAiProvider::new(config.clone())?)),
        "claude-code" => Ok(Arc::new(ClaudeCodeProvider::new(config.clone()))),
        _ => Err(AutodocError::Config(format!(
            "Unknown provider: {}. Supported: ollama, openai, claude-code",
            config.provider
        ))),
    }
}

// =============================================================================
// Client
// =============================================================================

/// Provider handle used by the pipeline: timeout + usage accounting.
///
/// Calls are never retried; a failure ends the run.
#[derive(Clone)]
pub struct LlmClient {
    provider: SharedProvider,
    metrics: SharedMetrics,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(provider: SharedProvider, metrics: SharedMetrics, timeout: Duration) -> Self {
        Self {
            provider,
            metrics,
            timeout,
        }
    }

    /// Submit one prompt and return the generated text
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(
            "Prompt to {} ({} chars)",
            self.provider.name(),
            prompt.chars().count()
        );

        let response = with_timeout(
            self.timeout,
            self.provider.generate(prompt),
            &format!("{} generate", self.provider.name()),
        )
        .await?;

        self.metrics.record_response(&response);
        Ok(response.content.trim().to_string())
    }

    pub fn provider(&self) -> &SharedProvider {
        &self.provider
    }

    pub fn metrics(&self) -> &SharedMetrics {
        &self.metrics
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted provider for pipeline tests.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Records every prompt. Answers with queued responses first, then
    /// with the first rule whose needle occurs in the prompt, then with a
    /// default echo of the prompt's first line.
    #[derive(Default)]
    pub struct ScriptedProvider {
        prompts: Mutex<Vec<String>>,
        responses: Mutex<VecDeque<Result<String>>>,
        rules: Mutex<Vec<(String, std::result::Result<String, String>)>>,
    }

    impl ScriptedProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_response(&self, response: impl Into<String>) {
            self.responses
                .lock()
                .unwrap()
                .push_back(Ok(response.into()));
        }

        pub fn push_error(&self, message: &str) {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err(AutodocError::LlmApi(message.to_string())));
        }

        /// Answer prompts containing `needle` with `response`
        pub fn respond_when(&self, needle: &str, response: &str) {
            self.rules
                .lock()
                .unwrap()
                .push((needle.to_string(), Ok(response.to_string())));
        }

        /// Fail prompts containing `needle`
        pub fn fail_when(&self, needle: &str, message: &str) {
            self.rules
                .lock()
                .unwrap()
                .push((needle.to_string(), Err(message.to_string())));
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }

        pub fn count_containing(&self, needle: &str) -> usize {
            self.prompts
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.contains(needle))
                .count()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn generate(&self, prompt: &str) -> Result<LlmResponse> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if let Some(queued) = self.responses.lock().unwrap().pop_front() {
                return queued.map(LlmResponse::content_only);
            }
            let rules = self.rules.lock().unwrap();
            match rules.iter().find(|(needle, _)| prompt.contains(needle.as_str())) {
                Some((_, Ok(text))) => Ok(LlmResponse::content_only(text.clone())),
                Some((_, Err(message))) => Err(AutodocError::LlmApi(message.clone())),
                None => Ok(LlmResponse::content_only(format!(
                    "generated: {}",
                    prompt.lines().next().unwrap_or_default()
                ))),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    /// Client over a scripted provider with a generous timeout
    pub fn client(provider: Arc<ScriptedProvider>) -> LlmClient {
        LlmClient::new(
            provider,
            crate::ai::metrics::create_shared_metrics("test"),
            Duration::from_secs(30),
        )
    }
}
