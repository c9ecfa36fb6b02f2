//! Doctor Command
//!
//! Checks configuration, the model backend and the embedder before a run.

use std::path::Path;

use tokio::runtime::Runtime;

use crate::ai::{ProviderConfig, create_embedder, create_provider};
use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::types::{AutodocError, Result};

pub fn run(config_path: Option<&Path>) -> Result<()> {
    let output = Output::new();
    output.header("autodoc doctor");

    let ctx = CommandContext::load(config_path, None)?;
    output.success("Configuration is valid");

    let provider = create_provider(&ProviderConfig::from(&ctx.config.llm))?;
    let embedder = create_embedder(&ctx.config.embedding)?;
    let rt = Runtime::new()?;

    let mut healthy = true;
    match rt.block_on(provider.health_check()) {
        Ok(true) => output.success(&format!(
            "LLM provider {} ({}) is reachable",
            provider.name(),
            provider.model()
        )),
        Ok(false) => {
            healthy = false;
            output.error(&format!(
                "LLM provider {} ({}) did not respond as expected",
                provider.name(),
                provider.model()
            ));
        }
        Err(e) => {
            healthy = false;
            output.error(&format!("LLM provider {}: {}", provider.name(), e));
            if let Some(category) = e.llm_category() {
                output.info(category.hint());
            }
        }
    }

    match rt.block_on(embedder.embed("health check")) {
        Ok(vector) => output.success(&format!(
            "Embedder {} returned {} dimensions",
            embedder.name(),
            vector.len()
        )),
        Err(e) => {
            healthy = false;
            output.error(&format!("Embedder {}: {}", embedder.name(), e));
        }
    }

    if healthy {
        Ok(())
    } else {
        Err(AutodocError::LlmApi(
            "health check failed; see messages above".to_string(),
        ))
    }
}
