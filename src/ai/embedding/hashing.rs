//! Feature-hashing embedder
//!
//! Lowercased word tokens and their character trigrams are hashed into a
//! fixed number of signed buckets, then L2-normalized. Deterministic across
//! runs and machines, so persisted vectors stay valid.

use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

use super::Embedder;
use crate::types::Result;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9_]+").expect("valid token regex"));

/// Trigram features count for less than whole words
const TRIGRAM_WEIGHT: f32 = 0.5;

pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Synchronous embedding; `embed` delegates here
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lower = text.to_lowercase();

        for token in TOKEN_RE.find_iter(&lower).map(|m| m.as_str()) {
            self.add_feature(&mut vector, token.as_bytes(), 1.0);

            let padded: Vec<char> = format!("#{}#", token).chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                self.add_feature(&mut vector, trigram.as_bytes(), TRIGRAM_WEIGHT);
            }
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }

    fn add_feature(&self, vector: &mut [f32], feature: &[u8], weight: f32) {
        let hash = crc32fast::hash(feature);
        let bucket = hash as usize % self.dimensions;
        // High bit picks the sign so collisions tend to cancel
        let sign = if hash & 0x8000_0000 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    fn name(&self) -> String {
        format!("hashing-{}", self.dimensions)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::embedding::cosine_similarity;

    #[test]
    fn test_deterministic_and_normalized() {
        let embedder = HashingEmbedder::new(64);
        let a = embedder.embed_text("Parser for the config file");
        let b = embedder.embed_text("Parser for the config file");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(16);
        assert!(embedder.embed_text("  ... ").iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_related_text_scores_higher() {
        let embedder = HashingEmbedder::new(384);
        let query = embedder.embed_text("http request handler routing");
        let related = embedder.embed_text("The handler module routes HTTP requests");
        let unrelated = embedder.embed_text("matrix multiplication kernels for gpu");

        assert!(
            cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated)
        );
    }

    #[tokio::test]
    async fn test_embed_trait() {
        let embedder = HashingEmbedder::new(32);
        let v = embedder.embed("hello").await.unwrap();
        assert_eq!(v.len(), embedder.dimensions());
        assert_eq!(embedder.name(), "hashing-32");
    }
}
