//! Repository Walk
//!
//! Produces the ordered list of folders to visit, each with its direct
//! files. Order is deterministic: pre-order, entries sorted by name, a
//! folder before its subfolders.
//!
//! Pruned subtrees (`.git` and any folder whose relative path contains a
//! `skip_folders` entry) are never descended into. Ignore files are not
//! consulted; selection is by suffix only.

use ignore::WalkBuilder;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants::analysis;
use crate::types::{AutodocError, Result};

/// One folder of the walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    /// Relative key (`"."` for the root, `/`-separated otherwise)
    pub key: String,
    /// Absolute or root-joined folder path
    pub path: PathBuf,
    /// Names of the folder's direct files, sorted
    pub files: Vec<String>,
}

pub struct RepositoryScanner {
    root: PathBuf,
    skip_folders: Vec<String>,
}

impl RepositoryScanner {
    pub fn new<P: AsRef<Path>>(root: P, skip_folders: &[String]) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            skip_folders: skip_folders.to_vec(),
        }
    }

    /// True if `key` contains any configured skip substring
    pub fn should_skip(&self, key: &str) -> bool {
        matches_skip(&self.skip_folders, key)
    }

    /// Walk the repository and return its folders in visit order
    pub fn scan(&self) -> Result<Vec<FolderEntry>> {
        if !self.root.is_dir() {
            return Err(AutodocError::Config(format!(
                "Repository path is not a directory: {}",
                self.root.display()
            )));
        }

        // The walker never filters its own root
        if self.should_skip(".") {
            debug!("Repository root matches a skip entry; nothing to scan");
            return Ok(Vec::new());
        }

        let root = self.root.clone();
        let skip = self.skip_folders.clone();

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(false) // Security: prevent symlink traversal attacks
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                if !is_dir {
                    return true;
                }
                if entry.file_name() == analysis::GIT_DIR {
                    return false;
                }
                !matches_skip(&skip, &relative_key(&root, entry.path()))
            })
            .build();

        let mut folders: Vec<FolderEntry> = Vec::new();
        let mut index: HashMap<PathBuf, usize> = HashMap::new();

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();

            if entry.file_type().is_some_and(|t| t.is_dir()) {
                let key = relative_key(&self.root, path);
                if self.should_skip(&key) {
                    debug!("Skipping folder: {}", key);
                    continue;
                }
                index.insert(path.to_path_buf(), folders.len());
                folders.push(FolderEntry {
                    key,
                    path: path.to_path_buf(),
                    files: Vec::new(),
                });
            } else if path.is_file() {
                let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
                if let Some(&i) = index.get(&parent) {
                    folders[i]
                        .files
                        .push(entry.file_name().to_string_lossy().into_owned());
                }
            }
        }

        for folder in &mut folders {
            folder.files.sort();
        }

        debug!(
            "Scanned {} folders under {}",
            folders.len(),
            self.root.display()
        );
        Ok(folders)
    }
}

fn matches_skip(skip_folders: &[String], key: &str) -> bool {
    skip_folders
        .iter()
        .any(|skip| !skip.is_empty() && key.contains(skip.as_str()))
}

/// Relative `/`-separated key of `path` under `root`; `"."` for the root
pub fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_relative_key() {
        let root = Path::new("/repo");
        assert_eq!(relative_key(root, Path::new("/repo")), ".");
        assert_eq!(relative_key(root, Path::new("/repo/src")), "src");
        assert_eq!(relative_key(root, Path::new("/repo/src/a/b")), "src/a/b");
    }

    #[test]
    fn test_scan_order_and_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "main.rs");
        touch(dir.path(), "b/z.rs");
        touch(dir.path(), "b/a.rs");
        touch(dir.path(), "a/inner/deep.rs");
        touch(dir.path(), "a/top.rs");

        let folders = RepositoryScanner::new(dir.path(), &[]).scan().unwrap();
        let keys: Vec<&str> = folders.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec![".", "a", "a/inner", "b"]);
        assert_eq!(folders[0].files, vec!["main.rs"]);
        assert_eq!(folders[3].files, vec!["a.rs", "z.rs"]);
    }

    #[test]
    fn test_skip_prunes_subtree() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a/b/skip_me/c/file.rs");
        touch(dir.path(), "a/b/keep.rs");
        touch(dir.path(), ".git/HEAD");

        let scanner = RepositoryScanner::new(dir.path(), &["skip_me".to_string()]);
        assert!(scanner.should_skip("a/b/skip_me/c"));

        let keys: Vec<String> = scanner.scan().unwrap().into_iter().map(|f| f.key).collect();
        assert_eq!(keys, vec![".", "a", "a/b"]);
    }

    #[test]
    fn test_skipped_root_prunes_everything() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "main.rs");
        touch(dir.path(), "src/lib.rs");

        let scanner = RepositoryScanner::new(dir.path(), &[".".to_string()]);
        assert!(scanner.should_skip("."));
        assert!(scanner.scan().unwrap().is_empty());
    }

    #[test]
    fn test_missing_root_is_error() {
        let dir = TempDir::new().unwrap();
        let err = RepositoryScanner::new(dir.path().join("absent"), &[])
            .scan()
            .unwrap_err();
        assert!(matches!(err, AutodocError::Config(_)));
    }
}
