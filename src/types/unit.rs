//! Analysis units: the folders and files that receive documentation.

use serde::{Deserialize, Serialize};

/// Kind of analysis unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Folder,
    File,
}

impl UnitKind {
    /// Label passed to the context summary prompt as `content_type`
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Folder => "folder",
            UnitKind::File => "file",
        }
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A documented folder or file, keyed by its repository-relative path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisUnit {
    pub kind: UnitKind,
    pub path: String,
    pub documentation: String,
}

impl AnalysisUnit {
    pub fn folder(path: impl Into<String>, documentation: impl Into<String>) -> Self {
        Self {
            kind: UnitKind::Folder,
            path: path.into(),
            documentation: documentation.into(),
        }
    }

    pub fn file(path: impl Into<String>, documentation: impl Into<String>) -> Self {
        Self {
            kind: UnitKind::File,
            path: path.into(),
            documentation: documentation.into(),
        }
    }
}

/// Join a folder key and a child name into a unit key.
///
/// The root folder is `"."`; its children are keyed by bare name.
pub fn join_key(folder: &str, name: &str) -> String {
    if folder == "." || folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder, name)
    }
}

/// Base name of a unit key (`"src/lib.rs"` -> `"lib.rs"`, `"."` -> `"."`)
pub fn base_name(key: &str) -> &str {
    let trimmed = key.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        return key;
    }
    trimmed
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_key() {
        assert_eq!(join_key(".", "main.rs"), "main.rs");
        assert_eq!(join_key("src", "lib.rs"), "src/lib.rs");
        assert_eq!(join_key("src/a", "b.rs"), "src/a/b.rs");
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("src/lib.rs"), "lib.rs");
        assert_eq!(base_name("main.rs"), "main.rs");
        assert_eq!(base_name("."), ".");
        assert_eq!(base_name("src\\win\\file.java"), "file.java");
        assert_eq!(base_name("src/pkg/"), "pkg");
    }

    #[test]
    fn test_unit_kind_label() {
        assert_eq!(UnitKind::Folder.as_str(), "folder");
        assert_eq!(AnalysisUnit::file("a.rs", "doc").kind.to_string(), "file");
    }
}
