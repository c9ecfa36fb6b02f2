//! Claude Code CLI Provider
//!
//! LLM provider using the local Claude Code CLI in print mode.
//! The CLI's JSON envelope carries the generated text and token usage.

use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info};

use super::{
    ErrorClassifier, LlmProvider, LlmResponse, ProviderConfig, ResponseMetadata, ResponseTiming,
    TokenUsage,
};
use crate::types::{AutodocError, Result};

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Claude Code CLI Provider
///
/// Each request spawns one `claude -p` process. The process is killed if
/// the request future is dropped (e.g. on timeout).
pub struct ClaudeCodeProvider {
    model: String,
    temperature: f32,
}

impl ClaudeCodeProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: config.temperature,
        }
    }

    /// Parse the CLI's JSON envelope into a response
    fn parse_output(&self, stdout: &str, elapsed: std::time::Duration) -> Result<LlmResponse> {
        let response: Value = serde_json::from_str(stdout).map_err(|e| {
            AutodocError::LlmApi(format!("Failed to parse Claude Code output: {}", e))
        })?;

        if response
            .get("is_error")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
        {
            let error_msg = response
                .get("result")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown API error");
            return Err(AutodocError::Llm(ErrorClassifier::classify(
                &format!("Claude Code API error: {}", error_msg),
                "claude-code",
            )));
        }

        let content = response
            .get("result")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AutodocError::LlmApi("No result text in Claude Code response".to_string())
            })?
            .to_string();

        Ok(LlmResponse::with_metrics(
            content,
            extract_usage(&response),
            ResponseTiming::from_duration(elapsed),
            ResponseMetadata {
                model: self.model.clone(),
                provider: "claude-code".to_string(),
            },
        ))
    }
}

/// Extract token usage from a Claude Code response
fn extract_usage(response: &Value) -> TokenUsage {
    let usage = response.get("usage");
    let count = |key: &str| {
        usage
            .and_then(|u| u.get(key))
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32
    };

    TokenUsage {
        input_tokens: count("input_tokens"),
        output_tokens: count("output_tokens"),
    }
}

#[async_trait]
impl LlmProvider for ClaudeCodeProvider {
    async fn generate(&self, prompt: &str) -> Result<LlmResponse> {
        debug!(
            "Executing Claude Code CLI (model={}, temperature={})",
            self.model, self.temperature
        );

        let start_time = Instant::now();

        let mut cmd = Command::new("claude");
        cmd.arg("-p")
            .arg(prompt)
            .arg("--output-format")
            .arg("json")
            .arg("--model")
            .arg(&self.model)
            .env("CLAUDE_CODE_TEMPERATURE", self.temperature.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            AutodocError::LlmApi(format!(
                "Failed to spawn Claude Code CLI: {}. Is it installed?",
                e
            ))
        })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| AutodocError::LlmApi(format!("Claude Code execution failed: {}", e)))?;

        let elapsed = start_time.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            // API errors are reported in the JSON envelope even on failure
            if serde_json::from_str::<Value>(&stdout).is_ok() {
                self.parse_output(&stdout, elapsed)?;
            }

            let stderr = String::from_utf8_lossy(&output.stderr);
            let error_msg = if stderr.trim().is_empty() {
                "Process exited with non-zero status"
            } else {
                stderr.trim()
            };
            return Err(AutodocError::LlmApi(format!(
                "Claude Code failed: {}",
                error_msg
            )));
        }

        self.parse_output(&stdout, elapsed)
    }

    fn name(&self) -> &str {
        "claude-code"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let output = Command::new("claude")
            .arg("--version")
            .output()
            .await
            .map_err(|e| AutodocError::LlmApi(format!("Claude Code not found: {}", e)))?;

        if output.status.success() {
            let version = String::from_utf8_lossy(&output.stdout);
            info!("Claude Code CLI available: {}", version.trim());
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    #[ignore = "requires claude CLI installed"]
    async fn test_health_check() {
        let provider = ClaudeCodeProvider::new(ProviderConfig::default());
        let result = provider.health_check().await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_extract_usage() {
        let response = serde_json::json!({
            "usage": {
                "input_tokens": 1000,
                "output_tokens": 500,
                "cache_read_input_tokens": 100
            }
        });

        let usage = extract_usage(&response);
        assert_eq!(usage.input_tokens, 1000);
        assert_eq!(usage.output_tokens, 500);
        assert_eq!(usage.total(), 1500);
    }

    #[test]
    fn test_parse_output_text() {
        let provider = ClaudeCodeProvider::new(ProviderConfig::default());
        let stdout = r#"{"type":"result","is_error":false,"result":"The folder holds parsers.","usage":{"input_tokens":10,"output_tokens":5}}"#;

        let response = provider
            .parse_output(stdout, Duration::from_millis(20))
            .unwrap();
        assert_eq!(response.content, "The folder holds parsers.");
        assert_eq!(response.usage.total(), 15);
        assert_eq!(response.metadata.provider, "claude-code");
    }

    #[test]
    fn test_parse_output_error_envelope() {
        let provider = ClaudeCodeProvider::new(ProviderConfig::default());
        let stdout = r#"{"is_error":true,"result":"rate limit exceeded"}"#;

        let err = provider
            .parse_output(stdout, Duration::from_millis(1))
            .unwrap_err();
        assert!(err.to_string().contains("rate limit"));
    }
}
