//! Config Command
//!
//! Usage:
//!   autodoc config show [--format toml|json]
//!   autodoc config path
//!   autodoc config init [--force]

use std::path::Path;

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Print the effective configuration
pub fn show(config_path: Option<&Path>, as_json: bool) -> Result<()> {
    let config = ConfigLoader::load_unvalidated(config_path)?;
    println!("{}", ConfigLoader::render(&config, as_json)?);

    if let Err(e) = config.validate() {
        Output::new().warning(&e.to_string());
    }
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Initialize project configuration
pub fn init(force: bool) -> Result<()> {
    let config_path = ConfigLoader::init_project(force)?;
    let output = Output::new();
    output.success("Initialized project configuration");
    output.field("Config", config_path.display());
    output.info("Set analysis.file_extensions, then run 'autodoc generate'");
    Ok(())
}
