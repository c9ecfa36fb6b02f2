//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/autodoc/config.toml)
//! 3. Project config (`--config`, default .autodoc/config.toml; TOML or JSON)
//! 4. Environment variables (AUTODOC_* prefix, `__` between sections)
//!
//! JSON project files may use the flat legacy layout
//! (`{"file_extensions": [...], "model": "...", "folder_prompt": "..."}`);
//! flat keys are mapped onto their sections before merging.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde_json::{Map, Value};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{AutodocError, Result};

/// Flat legacy keys and the `section.field` they map to
const LEGACY_KEYS: &[(&str, &str, &str)] = &[
    ("file_extensions", "analysis", "file_extensions"),
    ("skip_folders", "analysis", "skip_folders"),
    ("chunk_size", "analysis", "chunk_size"),
    ("chunk_overlap", "analysis", "chunk_overlap"),
    ("max_chunks", "analysis", "max_chunks"),
    ("model", "llm", "model"),
    ("folder_prompt", "prompts", "folder"),
    ("file_prompt", "prompts", "file"),
    ("combine_prompt", "prompts", "combine"),
    ("project_prompt", "prompts", "project"),
];

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project → env vars
    ///
    /// An explicitly given project file must exist; the default one is optional.
    pub fn load(project_config: Option<&Path>) -> Result<Config> {
        let config = Self::extract(Self::resolve(project_config)?)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration without validating it.
    ///
    /// For commands that only read saved progress and never call a model.
    pub fn load_unvalidated(project_config: Option<&Path>) -> Result<Config> {
        Self::extract(Self::resolve(project_config)?)
    }

    fn resolve(project_config: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = match project_config {
            Some(path) => {
                if !path.exists() {
                    return Err(AutodocError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Some(path.to_path_buf())
            }
            None => Some(Self::project_config_path()).filter(|p| p.exists()),
        };

        if let Some(path) = project_path {
            debug!("Loading project config from: {}", path.display());
            figment = Self::merge_file(figment, &path)?;
        }

        // e.g. AUTODOC_LLM__MODEL -> llm.model
        Ok(figment.merge(Env::prefixed("AUTODOC_").split("__")))
    }

    fn extract(figment: Figment) -> Result<Config> {
        figment
            .extract()
            .map_err(|e| AutodocError::Config(format!("Configuration error: {}", e)))
    }

    fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if !is_json {
            return Ok(figment.merge(Toml::file(path)));
        }

        let raw = fs::read_to_string(path).map_err(|e| {
            AutodocError::Config(format!("Cannot read config {}: {}", path.display(), e))
        })?;
        let value: Value = serde_json::from_str(&raw).map_err(|e| {
            AutodocError::Config(format!("Malformed JSON config {}: {}", path.display(), e))
        })?;

        Ok(figment.merge(Serialized::defaults(normalize_legacy(value)?)))
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/autodoc/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("autodoc"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".autodoc")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Print config file locations
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Render an effective configuration as TOML or JSON
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| AutodocError::Config(e.to_string()))
        }
    }

    /// Write a starter project config; returns its path
    pub fn init_project(force: bool) -> Result<PathBuf> {
        let project_dir = Self::project_dir();
        fs::create_dir_all(&project_dir)?;

        let config_path = Self::project_config_path();
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_project_config())?;
            info!("Created project config: {}", config_path.display());
        } else {
            info!("Project config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    /// Starter project config content (TOML)
    fn default_project_config() -> String {
        r#"# autodoc project configuration
# Settings here override ~/.config/autodoc/config.toml.

version = "1.0"

[analysis]
file_extensions = [".rs"]
skip_folders = ["target", "node_modules"]
chunk_size = 2000
chunk_overlap = 200
max_chunks = 10

[llm]
provider = "ollama"
model = "qwen:7b"
timeout_secs = 300

[embedding]
provider = "hashing"

[output]
save_dir = ".autodoc/doc"

# [prompts]
# folder = "Describe the folder {folder_path} containing {files}.\n{context}"
"#
        .to_string()
    }
}

/// Map flat legacy keys onto their nested sections.
///
/// Nested keys already present are kept; a flat key wins over the nested
/// field it maps to.
pub fn normalize_legacy(value: Value) -> Result<Value> {
    let Value::Object(map) = value else {
        return Err(AutodocError::Config(
            "JSON config must be an object".to_string(),
        ));
    };

    let mut out = Map::new();
    let mut moved = Vec::new();

    for (key, val) in map {
        match LEGACY_KEYS.iter().find(|(flat, _, _)| *flat == key) {
            Some((_, section, field)) => moved.push((*section, *field, val)),
            None => {
                out.insert(key, val);
            }
        }
    }

    for (section, field, val) in moved {
        let entry = out
            .entry(section.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        match entry {
            Value::Object(section_map) => {
                section_map.insert(field.to_string(), val);
            }
            _ => {
                return Err(AutodocError::Config(format!(
                    "'{}' must be an object",
                    section
                )));
            }
        }
    }

    Ok(Value::Object(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_legacy_flat_json() {
        let flat = json!({
            "file_extensions": [".java"],
            "model": "codeqwen:7b-chat",
            "chunk_size": 2000,
            "folder_prompt": "Describe {folder_path}",
        });

        let nested = normalize_legacy(flat).unwrap();
        assert_eq!(nested["analysis"]["file_extensions"], json!([".java"]));
        assert_eq!(nested["analysis"]["chunk_size"], json!(2000));
        assert_eq!(nested["llm"]["model"], json!("codeqwen:7b-chat"));
        assert_eq!(nested["prompts"]["folder"], json!("Describe {folder_path}"));
        assert!(nested.get("model").is_none());
    }

    #[test]
    fn test_normalize_keeps_nested_sections() {
        let mixed = json!({
            "llm": {"provider": "openai"},
            "model": "gpt-4o",
        });
        let nested = normalize_legacy(mixed).unwrap();
        assert_eq!(nested["llm"]["provider"], json!("openai"));
        assert_eq!(nested["llm"]["model"], json!("gpt-4o"));
    }

    #[test]
    fn test_load_legacy_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "file_extensions": [".java"],
                "model": "codeqwen:7b-chat",
                "chunk_size": 1500,
                "chunk_overlap": 100,
                "max_chunks": 4,
                "project_prompt": "Summarize:\n\n{documentation}\n\nProject Summary:"
            }"#,
        )
        .unwrap();

        let config = ConfigLoader::load(Some(&path)).unwrap();
        assert_eq!(config.analysis.file_extensions, vec![".java"]);
        assert_eq!(config.analysis.chunk_size, 1500);
        assert_eq!(config.analysis.max_chunks, 4);
        assert_eq!(config.llm.model, "codeqwen:7b-chat");
        assert!(config.prompts.project.starts_with("Summarize:"));
        // Untouched prompts keep their defaults
        assert!(config.prompts.file.contains("{chunk}"));
    }

    #[test]
    fn test_load_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[analysis]
file_extensions = [".py"]
skip_folders = ["venv"]

[llm]
provider = "openai"
model = "gpt-4o-mini"
"#,
        )
        .unwrap();

        let config = ConfigLoader::load(Some(&path)).unwrap();
        assert_eq!(config.analysis.file_extensions, vec![".py"]);
        assert_eq!(config.analysis.skip_folders, vec!["venv"]);
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.analysis.chunk_size, 2000);
    }

    #[test]
    fn test_load_unvalidated_skips_validation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[output]\nsave_dir = \"state\"\n").unwrap();

        assert!(ConfigLoader::load(Some(&path)).is_err());
        let config = ConfigLoader::load_unvalidated(Some(&path)).unwrap();
        assert_eq!(config.output.save_dir, PathBuf::from("state"));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = ConfigLoader::load(Some(&path)).unwrap_err();
        assert!(matches!(err, AutodocError::Config(_)));
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = TempDir::new().unwrap();
        let err = ConfigLoader::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_default_project_config_is_valid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, ConfigLoader::default_project_config()).unwrap();
        let config = ConfigLoader::load(Some(&path)).unwrap();
        assert_eq!(config.analysis.file_extensions, vec![".rs"]);
    }
}
