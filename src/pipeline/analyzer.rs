//! Codebase Analyzer
//!
//! Walks the repository and documents every folder and qualifying file
//! that is not yet in the Documentation Store. Each unit is persisted
//! (documentation first, then context state) as soon as it is done, so an
//! interrupted run resumes where it stopped.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::summarize::Summarizer;
use crate::ai::prompt::PromptTemplates;
use crate::ai::{LlmClient, SharedEmbedder, SharedMetrics};
use crate::analyzer::{RepositoryScanner, TextSplitter};
use crate::config::{AnalysisConfig, Config};
use crate::constants::analysis;
use crate::context::ContextManager;
use crate::storage::{DocumentationStore, ProgressStore};
use crate::types::{AnalysisUnit, AutodocError, Result, join_key};

/// Final result of a documentation run
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDocumentation {
    pub project_summary: String,
    pub component_documentation: DocumentationStore,
}

/// Called after each unit is documented and saved
pub type UnitCallback = Box<dyn Fn(&AnalysisUnit) + Send + Sync>;

pub struct CodebaseAnalyzer {
    repo_root: PathBuf,
    config: AnalysisConfig,
    templates: PromptTemplates,
    client: LlmClient,
    context: ContextManager,
    store: ProgressStore,
    documentation: DocumentationStore,
    scanner: RepositoryScanner,
    splitter: TextSplitter,
    summarizer: Summarizer,
    on_unit: Option<UnitCallback>,
}

impl CodebaseAnalyzer {
    pub async fn new(
        repo_root: impl AsRef<Path>,
        config: &Config,
        client: LlmClient,
        embedder: SharedEmbedder,
        store: ProgressStore,
    ) -> Result<Self> {
        let templates = PromptTemplates::from_config(&config.prompts)?;
        let analysis = config.analysis.clone();
        let repo_root = repo_root.as_ref().to_path_buf();

        let context =
            ContextManager::new(client.clone(), embedder, templates.summary_update.clone()).await?;
        let summarizer = Summarizer::new(
            client.clone(),
            templates.map.clone(),
            templates.reduce.clone(),
            analysis.reduce_token_max,
        );

        Ok(Self {
            scanner: RepositoryScanner::new(&repo_root, &analysis.skip_folders),
            splitter: TextSplitter::new(analysis.chunk_size, analysis.chunk_overlap),
            repo_root,
            config: analysis,
            templates,
            client,
            context,
            store,
            documentation: DocumentationStore::new(),
            summarizer,
            on_unit: None,
        })
    }

    /// Report each newly documented unit to `callback`
    pub fn on_unit(mut self, callback: UnitCallback) -> Self {
        self.on_unit = Some(callback);
        self
    }

    pub fn documentation(&self) -> &DocumentationStore {
        &self.documentation
    }

    pub fn context(&self) -> &ContextManager {
        &self.context
    }

    pub fn metrics(&self) -> &SharedMetrics {
        self.client.metrics()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// True if `path` contains any configured skip substring
    pub fn should_skip_folder(&self, path: &str) -> bool {
        self.scanner.should_skip(path)
    }

    /// True if `file_name` ends with a configured suffix
    pub fn should_analyze_file(&self, file_name: &str) -> bool {
        self.config
            .file_extensions
            .iter()
            .any(|ext| file_name.ends_with(ext.as_str()))
    }

    /// The test source folder is not documented itself; its subfolders are
    fn is_test_source_folder(key: &str) -> bool {
        key == analysis::TEST_SOURCE_FOLDER || key == "src\\test"
    }

    // =========================================================================
    // Units
    // =========================================================================

    /// Document a folder from the names of its files
    pub async fn analyze_folder(&self, folder_path: &str, files: &[String]) -> Result<String> {
        let matching: Vec<&str> = files
            .iter()
            .map(String::as_str)
            .filter(|name| self.should_analyze_file(name))
            .collect();

        if matching.is_empty() {
            debug!("No matching files in {}", folder_path);
            return Ok(String::new());
        }

        let context = self
            .context
            .get_relevant_context(folder_path, self.config.context_k)
            .await?;
        let files = matching.join(", ");
        let prompt = self.templates.folder.render(&[
            ("folder_path", folder_path),
            ("files", files.as_str()),
            ("context", context.as_str()),
        ]);
        self.client.complete(&prompt).await
    }

    /// Document a file, chunk by chunk or through the large-file path
    pub async fn analyze_file(&self, file_path: &str) -> Result<String> {
        let full_path = self.repo_root.join(file_path);
        let bytes = tokio::fs::read(&full_path)
            .await
            .map_err(|e| AutodocError::file_read(&full_path, e))?;
        let content = String::from_utf8_lossy(&bytes);

        let chunks = self.splitter.split(&content);
        if chunks.len() > self.config.max_chunks {
            info!(
                "{} has {} chunks (max {}); summarizing as a large file",
                file_path,
                chunks.len(),
                self.config.max_chunks
            );
            return self.analyze_large_file(file_path, &chunks).await;
        }

        let context = self
            .context
            .get_relevant_context(file_path, self.config.context_k)
            .await?;

        let mut chunk_docs = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            debug!("Documenting {} chunk {}/{}", file_path, i + 1, chunks.len());
            let prompt = self.templates.file.render(&[
                ("file_path", file_path),
                ("chunk", chunk.as_str()),
                ("context", context.as_str()),
            ]);
            chunk_docs.push(self.client.complete(&prompt).await?);
        }

        let chunk_docs = chunk_docs.join("\n\n");
        let prompt = self.templates.combine.render(&[
            ("file_path", file_path),
            ("chunk_docs", chunk_docs.as_str()),
            ("context", context.as_str()),
        ]);
        self.client.complete(&prompt).await
    }

    /// Map-reduce summary plus a relationship note
    pub async fn analyze_large_file(&self, file_path: &str, chunks: &[String]) -> Result<String> {
        let summary = self.summarizer.summarize(chunks).await?;

        let context = self
            .context
            .get_relevant_context(file_path, self.config.context_k)
            .await?;
        let prompt = self.templates.relationship.render(&[
            ("file_path", file_path),
            ("summary", summary.as_str()),
            ("context", context.as_str()),
        ]);
        let relationships = self.client.complete(&prompt).await?;

        self.metrics().record_large_file();
        Ok(format!(
            "Large file summary for {}:\n{}\n\nRelationships:\n{}",
            file_path, summary, relationships
        ))
    }

    // =========================================================================
    // Run
    // =========================================================================

    /// Restore saved progress; true if anything was restored
    pub async fn load_progress(&mut self) -> Result<bool> {
        self.documentation = self.store.load_documentation()?;
        let restored = self
            .context
            .load_state(&self.store, &self.documentation)
            .await?;
        Ok(restored || !self.documentation.is_empty())
    }

    fn save_progress(&self) -> Result<()> {
        self.store.save_documentation(&self.documentation)?;
        self.context
            .save_state(&self.store, self.documentation.len())
    }

    async fn record(&mut self, unit: AnalysisUnit) -> Result<()> {
        self.documentation
            .insert(unit.path.clone(), unit.documentation.clone());
        self.context
            .update_context(&unit.documentation, unit.kind)
            .await?;
        self.save_progress()?;

        self.metrics().record_unit(unit.kind);
        info!("Analyzed {}: {}", unit.kind, unit.path);
        if let Some(callback) = &self.on_unit {
            callback(&unit);
        }
        Ok(())
    }

    /// Document every unit not yet in the Documentation Store
    pub async fn analyze_codebase(&mut self) -> Result<&DocumentationStore> {
        if self.load_progress().await? {
            info!(
                "Resuming from previous analysis ({} units documented)",
                self.documentation.len()
            );
        } else {
            info!("Starting new analysis of {}", self.repo_root.display());
        }

        for folder in self.scanner.scan()? {
            if Self::is_test_source_folder(&folder.key) {
                debug!("Skipping test source folder: {}", folder.key);
                continue;
            }

            if self.documentation.contains(&folder.key) {
                self.metrics().record_resumed();
            } else if !folder.files.is_empty() {
                let doc = self.analyze_folder(&folder.key, &folder.files).await?;
                self.record(AnalysisUnit::folder(folder.key.clone(), doc))
                    .await?;
            }

            for name in &folder.files {
                if !self.should_analyze_file(name) {
                    continue;
                }
                let key = join_key(&folder.key, name);
                if self.documentation.contains(&key) {
                    self.metrics().record_resumed();
                    continue;
                }
                let doc = self.analyze_file(&key).await?;
                self.record(AnalysisUnit::file(key, doc)).await?;
            }
        }

        Ok(&self.documentation)
    }

    /// Run the analysis, then fold everything into a project overview
    pub async fn generate_documentation(&mut self) -> Result<ProjectDocumentation> {
        self.analyze_codebase().await?;

        info!(
            "Generating project overview from {} units",
            self.documentation.len()
        );
        let sections = self.documentation.render_sections();
        let prompt = self.templates.project.render(&[
            ("documentation", sections.as_str()),
            ("context_summary", self.context.summary()),
        ]);
        let project_summary = self.client.complete(&prompt).await?;
        self.store.save_project_summary(&project_summary)?;

        Ok(ProjectDocumentation {
            project_summary,
            component_documentation: self.documentation.clone(),
        })
    }
}
