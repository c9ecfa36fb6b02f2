//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Error Kinds
//!
//! - **Config**: missing or malformed configuration
//! - **FileRead**: a source file could not be read
//! - **Llm / LlmApi**: the model backend is unreachable or returned an error
//! - **Serialization**: persisted state is corrupt
//!
//! Nothing here is retried. Every error propagates to the top level and ends
//! the run; the next invocation resumes from the last saved unit.
//! LLM errors carry an `ErrorCategory` that only drives the hint printed to
//! the user.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Classification of model backend failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited by the backend
    RateLimit,
    /// Authentication failed
    Auth,
    /// Network/connectivity issues
    Network,
    /// Backend or model unavailable
    Unavailable,
    /// Request rejected as invalid
    BadRequest,
    /// Temporary server issues
    Transient,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Whether simply running again later is likely to get past this error
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimit | Self::Network | Self::Transient)
    }

    /// Short advice for the user
    pub fn hint(&self) -> &'static str {
        match self {
            Self::RateLimit => "the backend is rate limiting requests; wait before resuming",
            Self::Auth => "check the API key for the configured provider",
            Self::Network => "check that the model backend is reachable",
            Self::Unavailable => "check that the backend is running and the model is installed",
            Self::BadRequest => "the backend rejected the prompt; check the model name and prompts",
            Self::Transient => "the backend reported a temporary failure",
            Self::Unknown => "see the error message above",
        }
    }

    /// What to do about the saved progress after this error
    pub fn resume_advice(&self) -> &'static str {
        if self.is_transient() {
            "this is usually temporary; rerun later to resume"
        } else {
            "fix the cause above, then rerun to resume"
        }
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// Structured model backend error
#[derive(Debug, Clone)]
pub struct LlmError {
    pub category: ErrorCategory,
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps raw backend failures onto an `ErrorCategory`
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an error message from any provider
    pub fn classify(message: &str, provider: &str) -> LlmError {
        let lower = message.to_lowercase();

        let category = if lower.contains("rate limit")
            || lower.contains("429")
            || lower.contains("too many requests")
            || lower.contains("quota exceeded")
        {
            ErrorCategory::RateLimit
        } else if lower.contains("401")
            || lower.contains("403")
            || lower.contains("api key")
            || lower.contains("unauthorized")
        {
            ErrorCategory::Auth
        } else if lower.contains("connect")
            || lower.contains("dns")
            || lower.contains("timed out")
            || lower.contains("unreachable")
        {
            ErrorCategory::Network
        } else if lower.contains("not found")
            || lower.contains("not installed")
            || lower.contains("service unavailable")
        {
            ErrorCategory::Unavailable
        } else if lower.contains("400") || lower.contains("bad request") {
            ErrorCategory::BadRequest
        } else if lower.contains("overloaded")
            || lower.contains("temporary")
            || lower.contains("non-zero status")
        {
            ErrorCategory::Transient
        } else {
            ErrorCategory::Unknown
        };

        LlmError::with_provider(category, message, provider)
    }

    /// Classify an HTTP status code directly (more accurate than string matching)
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        let category = match status {
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            400 | 422 => ErrorCategory::BadRequest,
            404 => ErrorCategory::Unavailable,
            500 | 502 | 503 | 504 => ErrorCategory::Transient,
            _ => ErrorCategory::Unknown,
        };
        LlmError::with_provider(category, message, provider)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum AutodocError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Model Errors
    // -------------------------------------------------------------------------
    /// Structured LLM error with category
    #[error("LLM error: {0}")]
    Llm(LlmError),

    /// Unclassified LLM API error
    #[error("LLM API error: {0}")]
    LlmApi(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt persisted state in {}: {message}", path.display())]
    Serialization { path: PathBuf, message: String },
}

impl From<LlmError> for AutodocError {
    fn from(err: LlmError) -> Self {
        AutodocError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, AutodocError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl AutodocError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a file read error for `path`
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error for `path`
    pub fn serialization(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Serialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Category of a model-side failure, if this is one
    pub fn llm_category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Llm(e) => Some(e.category),
            Self::LlmApi(msg) => Some(ErrorClassifier::classify(msg, "unknown").category),
            Self::Timeout { .. } => Some(ErrorCategory::Network),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
        assert_eq!(ErrorCategory::Unavailable.to_string(), "UNAVAILABLE");
    }

    #[test]
    fn test_error_category_transient() {
        assert!(ErrorCategory::RateLimit.is_transient());
        assert!(ErrorCategory::Network.is_transient());
        assert!(!ErrorCategory::Auth.is_transient());
        assert!(!ErrorCategory::BadRequest.is_transient());
    }

    #[test]
    fn test_resume_advice_follows_transience() {
        assert!(ErrorCategory::RateLimit.resume_advice().contains("rerun later"));
        assert!(ErrorCategory::Transient.resume_advice().contains("rerun later"));
        assert!(ErrorCategory::Auth.resume_advice().starts_with("fix the cause"));
        assert!(ErrorCategory::Unknown.resume_advice().starts_with("fix the cause"));
    }

    #[test]
    fn test_classify_messages() {
        let err = ErrorClassifier::classify("Rate limit exceeded, please retry", "openai");
        assert_eq!(err.category, ErrorCategory::RateLimit);

        let err = ErrorClassifier::classify("Invalid API key provided", "openai");
        assert_eq!(err.category, ErrorCategory::Auth);

        let err = ErrorClassifier::classify(
            "Failed to connect to Ollama at http://localhost:11434",
            "ollama",
        );
        assert_eq!(err.category, ErrorCategory::Network);

        let err = ErrorClassifier::classify("model 'qwen:7b' not found", "ollama");
        assert_eq!(err.category, ErrorCategory::Unavailable);

        let err = ErrorClassifier::classify("Something weird happened", "test");
        assert_eq!(err.category, ErrorCategory::Unknown);
    }

    #[test]
    fn test_classify_http_status() {
        let rate_limit = ErrorClassifier::classify_http_status(429, "Rate limited", "test");
        assert_eq!(rate_limit.category, ErrorCategory::RateLimit);

        let auth = ErrorClassifier::classify_http_status(401, "Unauthorized", "test");
        assert_eq!(auth.category, ErrorCategory::Auth);

        let server_error = ErrorClassifier::classify_http_status(500, "Server error", "test");
        assert_eq!(server_error.category, ErrorCategory::Transient);
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::with_provider(ErrorCategory::RateLimit, "Too many requests", "openai");
        assert_eq!(err.to_string(), "[openai:RATE_LIMIT] Too many requests");

        let err_no_provider = LlmError {
            category: ErrorCategory::Network,
            message: "Connection failed".into(),
            provider: None,
        };
        assert_eq!(err_no_provider.to_string(), "[NETWORK] Connection failed");
    }

    #[test]
    fn test_file_read_display() {
        let err = AutodocError::file_read(
            "src/main.rs",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        let msg = err.to_string();
        assert!(msg.contains("src/main.rs"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn test_llm_category() {
        let err = AutodocError::from(LlmError::with_provider(
            ErrorCategory::Auth,
            "nope",
            "openai",
        ));
        assert_eq!(err.llm_category(), Some(ErrorCategory::Auth));
        assert_eq!(
            AutodocError::Config("bad".into()).llm_category(),
            None
        );
    }
}
