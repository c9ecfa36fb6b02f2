//! Status Command
//!
//! Reports saved progress without calling a model.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, excerpt};
use crate::storage::ProgressStore;
use crate::types::Result;

const SUMMARY_EXCERPT_CHARS: usize = 200;

/// Snapshot of the persisted state
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub save_dir: PathBuf,
    pub documented_units: usize,
    pub empty_units: usize,
    pub context_units: Option<usize>,
    pub fragments: Option<usize>,
    pub embedder: Option<String>,
    pub summary: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub project_summary: bool,
}

impl StatusReport {
    pub fn collect(store: &ProgressStore) -> Result<Self> {
        let documentation = store.load_documentation()?;
        let context = store.load_context()?;

        Ok(Self {
            save_dir: store.dir().to_path_buf(),
            documented_units: documentation.len(),
            empty_units: documentation
                .iter()
                .filter(|(_, doc)| doc.trim().is_empty())
                .count(),
            context_units: context.as_ref().map(|c| c.documented_units),
            fragments: context.as_ref().map(|c| c.fragments.len()),
            embedder: context.as_ref().map(|c| c.embedder.clone()),
            summary: context.as_ref().map(|c| c.summary.clone()),
            last_updated: context.as_ref().map(|c| c.updated_at),
            project_summary: store.summary_path().exists(),
        })
    }

    /// Context state saved fewer units than the documentation holds
    pub fn context_behind(&self) -> bool {
        self.context_units
            .is_some_and(|units| units < self.documented_units)
    }
}

pub fn run(config_path: Option<&Path>, save_dir: Option<PathBuf>, format: &str) -> Result<()> {
    let ctx = CommandContext::load_for_progress(config_path, save_dir)?;
    let report = StatusReport::collect(&ctx.progress_store())?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let output = Output::new();
    output.header("autodoc status");
    output.field("Save dir", report.save_dir.display());

    if report.documented_units == 0 && report.context_units.is_none() {
        output.info("No saved progress. Run 'autodoc generate' to start.");
        return Ok(());
    }

    output.field(
        "Documented",
        format!(
            "{} units ({} without matching files)",
            report.documented_units, report.empty_units
        ),
    );
    if let Some(fragments) = report.fragments {
        output.field("Fragments", fragments);
    }
    if let Some(embedder) = &report.embedder {
        output.field("Embedder", embedder);
    }
    if let Some(updated) = report.last_updated {
        output.field("Last update", updated.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    output.field(
        "Overview",
        if report.project_summary {
            "written"
        } else {
            "not yet written"
        },
    );
    if let Some(summary) = &report.summary {
        output.section("Running summary");
        println!("{}", excerpt(summary, SUMMARY_EXCERPT_CHARS));
    }

    if report.context_behind() {
        output.warning("Context state lags the documentation; it is repaired on the next run");
    }
    Ok(())
}
