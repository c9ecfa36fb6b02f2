//! Ollama embedding backend (`/api/embeddings`)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

use super::Embedder;
use crate::ai::provider::{DEFAULT_OLLAMA_API_BASE, ErrorClassifier, validate_endpoint};
use crate::config::EmbeddingConfig;
use crate::constants::network;
use crate::types::{AutodocError, Result};

pub struct OllamaEmbedder {
    api_base: String,
    model: String,
    /// Learned from the first response
    dimensions: OnceLock<usize>,
    client: reqwest::Client,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_base = validate_endpoint(
            config
                .api_base
                .as_deref()
                .unwrap_or(DEFAULT_OLLAMA_API_BASE),
        )?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(network::DEFAULT_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(network::CONNECTION_TIMEOUT_SECS))
            .build()
            .map_err(|e| AutodocError::Embedding(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_base,
            model: config.model.clone(),
            dimensions: OnceLock::new(),
            client,
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.api_base);
        debug!("Embedding {} chars with {}", text.len(), self.model);

        let response = self
            .client
            .post(&url)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| {
                AutodocError::Llm(ErrorClassifier::classify(
                    &format!("Failed to connect to Ollama embeddings at {}: {}", url, e),
                    "ollama",
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AutodocError::Llm(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Ollama embeddings error ({}): {}", status, body),
                "ollama",
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AutodocError::Embedding(format!("Failed to parse Ollama embedding: {}", e))
        })?;

        if body.embedding.is_empty() {
            return Err(AutodocError::Embedding(format!(
                "Ollama returned an empty embedding for model {}",
                self.model
            )));
        }

        let expected = *self.dimensions.get_or_init(|| body.embedding.len());
        if body.embedding.len() != expected {
            return Err(AutodocError::Embedding(format!(
                "Embedding size changed from {} to {}",
                expected,
                body.embedding.len()
            )));
        }

        Ok(body.embedding)
    }

    fn name(&self) -> String {
        format!("ollama:{}", self.model)
    }

    /// 0 until the first embedding has been returned
    fn dimensions(&self) -> usize {
        self.dimensions.get().copied().unwrap_or(0)
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let config = EmbeddingConfig {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            ..Default::default()
        };
        let embedder = OllamaEmbedder::new(&config).unwrap();
        assert_eq!(embedder.name(), "ollama:nomic-embed-text");
        assert_eq!(embedder.api_base, "http://localhost:11434");
        assert_eq!(embedder.dimensions(), 0);
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        let config = EmbeddingConfig {
            provider: "ollama".to_string(),
            api_base: Some("file:///tmp/socket".to_string()),
            ..Default::default()
        };
        assert!(OllamaEmbedder::new(&config).is_err());
    }

    #[test]
    fn test_parse_response() {
        let body: EmbeddingResponse =
            serde_json::from_str(r#"{"embedding":[0.1,0.2,0.3]}"#).unwrap();
        assert_eq!(body.embedding.len(), 3);
    }
}
