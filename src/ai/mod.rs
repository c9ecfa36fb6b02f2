//! AI Integration Layer
//!
//! Model backends, embeddings, prompt templates and usage accounting for
//! documentation generation.

pub mod embedding;
pub mod metrics;
pub mod prompt;
pub mod provider;
pub mod timeout;
pub mod tokenizer;

pub use embedding::{
    Embedder, HashingEmbedder, OllamaEmbedder, SharedEmbedder, cosine_similarity,
    create_embedder,
};
pub use metrics::{MetricsCollector, MetricsSummary, SharedMetrics, create_shared_metrics};
pub use prompt::{PromptConfig, PromptKind, PromptTemplate, PromptTemplates};
pub use provider::{
    ClaudeCodeProvider, ErrorCategory, ErrorClassifier, LlmClient, LlmError, LlmProvider,
    LlmResponse, OllamaProvider, OpenAiProvider, ProviderConfig, ResponseMetadata,
    ResponseTiming, SharedProvider, TokenUsage, create_provider,
};
pub use timeout::with_timeout;
pub use tokenizer::{TokenCounter, TokenEstimator};
