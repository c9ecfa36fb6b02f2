//! Embedding Backends
//!
//! Turns context fragments into vectors for similarity retrieval.
//!
//! - `hashing`: local feature-hashing embedder (default, no network)
//! - `ollama`: Ollama `/api/embeddings`
//!
//! Every embedder has an identity (`name()`) and a fixed dimension; both are
//! persisted with the context state so stored vectors are never mixed with
//! vectors from a different model.

mod hashing;
mod ollama;

pub use hashing::HashingEmbedder;
pub use ollama::OllamaEmbedder;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::EmbeddingConfig;
use crate::types::{AutodocError, Result};

/// Text embedding backend
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed one text; the result has `dimensions()` entries
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Stable identity, e.g. `hashing-384` or `ollama:nomic-embed-text`
    fn name(&self) -> String;

    /// Vector length produced by `embed`
    fn dimensions(&self) -> usize;
}

/// Shared embedder handle.
pub type SharedEmbedder = Arc<dyn Embedder>;

/// Create an embedder from configuration
pub fn create_embedder(config: &EmbeddingConfig) -> Result<SharedEmbedder> {
    match config.provider.as_str() {
        "hashing" => Ok(Arc::new(HashingEmbedder::new(config.dimensions))),
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(config)?)),
        other => Err(AutodocError::Config(format!(
            "Unknown embedding provider: {}. Supported: hashing, ollama",
            other
        ))),
    }
}

/// Cosine similarity of two vectors; 0.0 when either is zero or lengths differ
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
