//! Export Command
//!
//! Writes saved documentation as a single markdown file.

use std::path::{Path, PathBuf};

use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::constants::storage::DEFAULT_MARKDOWN_OUTPUT;
use crate::export::MarkdownExporter;
use crate::types::Result;

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub save_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub skip_empty: bool,
    pub with_summary: bool,
}

pub fn run(config_path: Option<&Path>, options: ExportOptions) -> Result<()> {
    let ctx = CommandContext::load_for_progress(config_path, options.save_dir)?;
    let store = ctx.progress_store();
    let output_path = options
        .output
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MARKDOWN_OUTPUT));
    let output = Output::new();

    if !store.documentation_path().exists() {
        output.warning(&format!(
            "No documentation saved in {}",
            store.dir().display()
        ));
    }

    let mut exporter = MarkdownExporter::new().skip_empty(options.skip_empty);
    if options.with_summary {
        match store.load_project_summary()? {
            Some(summary) => exporter = exporter.with_summary(summary),
            None => output.warning("No project overview yet; exporting units only"),
        }
    }

    let sections = exporter.export(&store, &output_path)?;
    output.success(&format!(
        "Exported {} sections to {}",
        sections,
        output_path.display()
    ));
    Ok(())
}
