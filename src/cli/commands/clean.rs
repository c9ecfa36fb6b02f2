//! Clean Command
//!
//! Deletes saved progress so the next run starts from scratch.

use std::path::{Path, PathBuf};

use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::types::Result;

pub fn run(config_path: Option<&Path>, save_dir: Option<PathBuf>) -> Result<()> {
    let ctx = CommandContext::load_for_progress(config_path, save_dir)?;
    let removed = ctx.progress_store().clear()?;

    let output = Output::new();
    if removed == 0 {
        output.info(&format!("Nothing to clean in {}", ctx.save_dir.display()));
    } else {
        output.success(&format!(
            "Removed {} file(s) from {}",
            removed,
            ctx.save_dir.display()
        ));
    }
    Ok(())
}
