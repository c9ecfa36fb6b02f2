//! Progress Store
//!
//! Owns the save directory and every file in it:
//!
//! - `documentation.json`: the ordered Documentation Store
//! - `context_state.json`: the Context Manager state
//! - `project_summary.md`: the final project overview
//!
//! Each file is replaced atomically (temp file, fsync, rename). Files are
//! opened only for the duration of a single load or save.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::DocumentationStore;
use crate::constants::storage;
use crate::context::ContextState;
use crate::types::{AutodocError, Result};

/// Handle to the persisted progress of one repository
#[derive(Debug, Clone)]
pub struct ProgressStore {
    dir: PathBuf,
}

impl ProgressStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn documentation_path(&self) -> PathBuf {
        self.dir.join(storage::DOCUMENTATION_FILE)
    }

    pub fn context_path(&self) -> PathBuf {
        self.dir.join(storage::CONTEXT_STATE_FILE)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.dir.join(storage::PROJECT_SUMMARY_FILE)
    }

    /// True if any progress has been saved
    pub fn has_progress(&self) -> bool {
        self.documentation_path().exists() || self.context_path().exists()
    }

    // =========================================================================
    // Documentation
    // =========================================================================

    /// Load the Documentation Store; a missing file is an empty store
    pub fn load_documentation(&self) -> Result<DocumentationStore> {
        Ok(self
            .read_json(&self.documentation_path())?
            .unwrap_or_default())
    }

    pub fn save_documentation(&self, documentation: &DocumentationStore) -> Result<()> {
        self.write_json(&self.documentation_path(), documentation)
    }

    // =========================================================================
    // Context State
    // =========================================================================

    /// Load the context state; `None` when nothing was saved yet
    pub fn load_context(&self) -> Result<Option<ContextState>> {
        self.read_json(&self.context_path())
    }

    pub fn save_context(&self, state: &ContextState) -> Result<()> {
        self.write_json(&self.context_path(), state)
    }

    // =========================================================================
    // Project Summary
    // =========================================================================

    pub fn save_project_summary(&self, summary: &str) -> Result<()> {
        self.write_atomic(&self.summary_path(), summary.as_bytes())
    }

    pub fn load_project_summary(&self) -> Result<Option<String>> {
        let path = self.summary_path();
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AutodocError::file_read(path, e)),
        }
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Delete all persisted files; returns how many were removed
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        for path in [
            self.documentation_path(),
            self.context_path(),
            self.summary_path(),
        ] {
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Removed {}", path.display());
                    removed += 1;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(removed)
    }

    // =========================================================================
    // File I/O
    // =========================================================================

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AutodocError::file_read(path, e)),
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| AutodocError::serialization(path, e.to_string()))
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.write_atomic(path, json.as_bytes())
    }

    /// Write to a sibling temp file, fsync, then rename over `path`
    fn write_atomic(&self, path: &Path, content: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);

        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        debug!("Saved {} ({} bytes)", path.display(), content.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_files_are_empty_state() {
        let dir = TempDir::new().unwrap();
        let store = ProgressStore::new(dir.path().join("doc"));

        assert!(!store.has_progress());
        assert!(store.load_documentation().unwrap().is_empty());
        assert!(store.load_context().unwrap().is_none());
        assert!(store.load_project_summary().unwrap().is_none());
    }

    #[test]
    fn test_documentation_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = ProgressStore::new(dir.path().join("nested/doc"));

        let mut docs = DocumentationStore::new();
        docs.insert("src", "sources");
        docs.insert("src/a.rs", "module a");
        store.save_documentation(&docs).unwrap();

        assert!(store.has_progress());
        assert_eq!(store.load_documentation().unwrap(), docs);
        assert!(!dir.path().join("nested/doc/documentation.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        let store = ProgressStore::new(dir.path());
        fs::write(store.documentation_path(), "{ truncated").unwrap();

        let err = store.load_documentation().unwrap_err();
        assert!(matches!(err, AutodocError::Serialization { .. }));
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let store = ProgressStore::new(dir.path());
        store.save_documentation(&DocumentationStore::new()).unwrap();
        store.save_project_summary("overview").unwrap();

        assert_eq!(store.clear().unwrap(), 2);
        assert!(!store.has_progress());
        assert_eq!(store.clear().unwrap(), 0);
    }
}
