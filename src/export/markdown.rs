//! Markdown export
//!
//! One `## name` section per documented unit, in documentation order.

use std::path::Path;

use tracing::info;

use crate::storage::{DocumentationStore, ProgressStore};
use crate::types::{Result, base_name};

#[derive(Debug, Clone, Default)]
pub struct MarkdownExporter {
    skip_empty: bool,
    summary: Option<String>,
}

impl MarkdownExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Omit units whose documentation is empty
    pub fn skip_empty(mut self, skip: bool) -> Self {
        self.skip_empty = skip;
        self
    }

    /// Prepend a project overview section
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn render(&self, documentation: &DocumentationStore) -> String {
        let mut out = String::new();

        if let Some(summary) = &self.summary {
            out.push_str("# Project Overview\n\n");
            out.push_str(summary);
            out.push_str("\n\n");
        }

        for (key, doc) in documentation.iter() {
            if self.skip_empty && doc.trim().is_empty() {
                continue;
            }
            out.push_str("## ");
            out.push_str(base_name(key));
            out.push_str("\n\n");
            out.push_str(doc);
            out.push_str("\n\n");
        }
        out
    }

    /// Render the saved documentation into `output`; returns the section count
    pub fn export(&self, store: &ProgressStore, output: &Path) -> Result<usize> {
        let documentation = store.load_documentation()?;
        let rendered = self.render(&documentation);

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(output, rendered)?;

        let sections = documentation
            .iter()
            .filter(|(_, doc)| !(self.skip_empty && doc.trim().is_empty()))
            .count();
        info!("Exported {} sections to {}", sections, output.display());
        Ok(sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> DocumentationStore {
        let mut docs = DocumentationStore::new();
        docs.insert(".", "root folder");
        docs.insert("main.rs", "entry point");
        docs.insert("docs", "");
        docs.insert("src/lib.rs", "library");
        docs
    }

    #[test]
    fn test_plain_format() {
        let rendered = MarkdownExporter::new().render(&sample());
        assert_eq!(
            rendered,
            "## .\n\nroot folder\n\n## main.rs\n\nentry point\n\n## docs\n\n\n\n## lib.rs\n\nlibrary\n\n"
        );
    }

    #[test]
    fn test_skip_empty_and_summary() {
        let rendered = MarkdownExporter::new()
            .skip_empty(true)
            .with_summary("overall")
            .render(&sample());
        assert!(rendered.starts_with("# Project Overview\n\noverall\n\n## .\n\n"));
        assert!(!rendered.contains("## docs"));
        assert!(rendered.ends_with("## lib.rs\n\nlibrary\n\n"));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = TempDir::new().unwrap();
        let store = ProgressStore::new(dir.path().join("state"));
        store.save_documentation(&sample()).unwrap();

        let output = dir.path().join("out/output.md");
        let count = MarkdownExporter::new()
            .skip_empty(true)
            .export(&store, &output)
            .unwrap();

        assert_eq!(count, 3);
        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("## .\n\nroot folder"));
    }

    #[test]
    fn test_unwritable_output_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = ProgressStore::new(dir.path().join("state"));
        store.save_documentation(&sample()).unwrap();

        // The target exists as a directory
        let output = dir.path().join("taken");
        std::fs::create_dir(&output).unwrap();

        let err = MarkdownExporter::new().export(&store, &output).unwrap_err();
        assert!(matches!(err, crate::types::AutodocError::Io(_)));
    }

    #[test]
    fn test_export_without_progress_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = ProgressStore::new(dir.path());
        let output = dir.path().join("output.md");

        assert_eq!(MarkdownExporter::new().export(&store, &output).unwrap(), 0);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
    }
}
