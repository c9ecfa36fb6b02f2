//! autodoc - Resumable LLM-Driven Documentation Generator
//!
//! Walks a source repository and documents every folder and selected file
//! with a language model, carrying a running project summary and a
//! similarity index of earlier results into each prompt. Progress is saved
//! after every unit, so an interrupted run resumes where it stopped.
//!
//! ## Quick Start
//!
//! ```ignore
//! use autodoc::{CodebaseAnalyzer, ConfigLoader, ProgressStore};
//! use autodoc::ai::{LlmClient, ProviderConfig, create_embedder, create_provider, create_shared_metrics};
//!
//! let config = ConfigLoader::load(None)?;
//! let provider = create_provider(&ProviderConfig::from(&config.llm))?;
//! let client = LlmClient::new(provider, create_shared_metrics("run"), timeout);
//! let embedder = create_embedder(&config.embedding)?;
//! let store = ProgressStore::new(&config.output.save_dir);
//!
//! let mut analyzer = CodebaseAnalyzer::new(".", &config, client, embedder, store).await?;
//! let result = analyzer.generate_documentation().await?;
//! println!("{}", result.project_summary);
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: LLM providers, embedders, prompt templates, metrics
//! - [`analyzer`]: repository walk and text chunking
//! - [`context`]: running summary and similarity index
//! - [`pipeline`]: the resumable documentation run
//! - [`storage`]: persisted progress
//! - [`export`]: markdown output

pub mod ai;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod context;
pub mod export;
pub mod pipeline;
pub mod storage;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader};
pub use types::{AnalysisUnit, AutodocError, ErrorCategory, Result, UnitKind};

pub use context::{ContextManager, ContextState};
pub use export::MarkdownExporter;
pub use pipeline::{CodebaseAnalyzer, ProjectDocumentation};
pub use storage::{DocumentationStore, ProgressStore};

pub use ai::{Embedder, LlmClient, LlmProvider, LlmResponse, MetricsCollector, SharedMetrics};
