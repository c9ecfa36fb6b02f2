//! Generate Command
//!
//! Documents the repository, resuming from saved progress, then writes the
//! project overview.
//!
//! Usage:
//!   autodoc generate [PATH] [--save-dir DIR] [--provider P] [--model M]

use std::path::{Path, PathBuf};

use tokio::runtime::Runtime;
use tracing::info;

use crate::ai::create_embedder;
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, session_id};
use crate::config::LlmConfig;
use crate::pipeline::CodebaseAnalyzer;
use crate::types::{AnalysisUnit, AutodocError, Result};

/// Generate run options
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Repository root
    pub path: PathBuf,
    /// Save directory override
    pub save_dir: Option<PathBuf>,
    /// LLM provider override
    pub provider: Option<String>,
    /// Model override
    pub model: Option<String>,
}

/// Apply `--provider` / `--model`.
///
/// A configured model belongs to the configured provider, so switching
/// provider without naming a model falls back to the new provider's default.
fn apply_llm_overrides(llm: &mut LlmConfig, provider: Option<String>, model: Option<String>) {
    if let Some(provider) = provider
        && provider != llm.provider
    {
        llm.provider = provider;
        llm.model.clear();
    }
    if let Some(model) = model {
        llm.model = model;
    }
}

pub fn run(config_path: Option<&Path>, options: GenerateOptions) -> Result<()> {
    let GenerateOptions {
        path,
        save_dir,
        provider,
        model,
    } = options;

    let mut ctx = CommandContext::load(config_path, save_dir)?;
    apply_llm_overrides(&mut ctx.config.llm, provider, model);

    if !path.is_dir() {
        return Err(AutodocError::Config(format!(
            "Repository path is not a directory: {}",
            path.display()
        )));
    }

    let output = Output::new();
    output.header("autodoc generate");
    output.field("Repository", path.display());
    output.field("Save dir", ctx.save_dir.display());
    let model_name = if ctx.config.llm.model.is_empty() {
        "provider default"
    } else {
        ctx.config.llm.model.as_str()
    };
    output.field(
        "Model",
        format!("{} ({})", model_name, ctx.config.llm.provider),
    );
    output.field(
        "Extensions",
        ctx.config.analysis.file_extensions.join(", "),
    );

    let store = ctx.progress_store();
    if store.has_progress() {
        output.info("Saved progress found; documented units will be skipped");
    }

    let client = ctx.build_client(&session_id())?;
    info!(
        "Using LLM provider: {} ({})",
        client.provider().name(),
        client.provider().model()
    );
    let embedder = create_embedder(&ctx.config.embedding)?;
    info!("Using embedder: {}", embedder.name());

    output.section("Documenting");
    let rt = Runtime::new()?;
    let result = rt.block_on(async {
        let mut analyzer = CodebaseAnalyzer::new(&path, &ctx.config, client.clone(), embedder, store)
            .await?
            .on_unit(Box::new(|unit: &AnalysisUnit| Output::new().unit(unit)));
        analyzer.generate_documentation().await
    })?;

    let metrics = client.metrics().summary();
    info!("Run metrics:\n{}", metrics.display());

    output.section("Project Overview");
    println!("{}", result.project_summary);

    println!();
    output.success(&format!(
        "{} units documented ({} new folders, {} new files, {} large)",
        result.component_documentation.len(),
        metrics.folders,
        metrics.files,
        metrics.large_files
    ));
    output.field(
        "API calls",
        format!("{} ({} tokens)", metrics.api_calls, metrics.total_tokens),
    );
    output.field("Saved to", ctx.save_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ProviderConfig;

    #[test]
    fn test_provider_switch_drops_configured_model() {
        let mut llm = LlmConfig::default();
        assert_eq!(llm.provider, "ollama");

        apply_llm_overrides(&mut llm, Some("openai".into()), None);
        assert_eq!(llm.provider, "openai");
        assert!(llm.model.is_empty());
        assert_eq!(ProviderConfig::from(&llm).model, None);
    }

    #[test]
    fn test_explicit_model_wins() {
        let mut llm = LlmConfig::default();
        apply_llm_overrides(&mut llm, Some("openai".into()), Some("gpt-4o".into()));
        assert_eq!(llm.provider, "openai");
        assert_eq!(llm.model, "gpt-4o");
    }

    #[test]
    fn test_same_provider_keeps_model() {
        let mut llm = LlmConfig::default();
        let configured = llm.model.clone();
        apply_llm_overrides(&mut llm, Some("ollama".into()), None);
        assert_eq!(llm.model, configured);

        apply_llm_overrides(&mut llm, None, Some("llama3".into()));
        assert_eq!(llm.provider, "ollama");
        assert_eq!(llm.model, "llama3");
    }
}
