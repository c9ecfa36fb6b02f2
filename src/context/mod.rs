//! Context Manager
//!
//! Accumulates what has been learned about the project so far:
//!
//! - a similarity index over every documented unit's text (plus a seed
//!   fragment), queried to ground each new prompt
//! - a running summary, regenerated by the model after every unit
//!
//! The state is persisted through a `ProgressStore` after every unit. The
//! summary is replaced wholesale by each update; nothing is merged.

pub mod vector_index;

pub use vector_index::{Fragment, VectorIndex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ai::prompt::PromptTemplate;
use crate::ai::{LlmClient, SharedEmbedder};
use crate::constants::{context, storage};
use crate::storage::{DocumentationStore, ProgressStore};
use crate::types::{Result, UnitKind};

// =============================================================================
// Persisted State
// =============================================================================

/// Serialized form of the Context Manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextState {
    pub version: u32,
    /// Running project summary
    pub summary: String,
    /// Indexed fragments in insertion order
    pub fragments: VectorIndex,
    /// Documentation Store length when this state was saved
    pub documented_units: usize,
    /// Identity of the embedder that produced the vectors
    pub embedder: String,
    pub dimensions: usize,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Manager
// =============================================================================

pub struct ContextManager {
    client: LlmClient,
    embedder: SharedEmbedder,
    summary_prompt: PromptTemplate,
    index: VectorIndex,
    summary: String,
    updated_at: Option<DateTime<Utc>>,
}

impl ContextManager {
    /// Create a manager in the initial state (seed fragment and summary)
    pub async fn new(
        client: LlmClient,
        embedder: SharedEmbedder,
        summary_prompt: PromptTemplate,
    ) -> Result<Self> {
        let mut index = VectorIndex::new();
        let seed = embedder.embed(context::SEED_FRAGMENT).await?;
        index.add(context::SEED_FRAGMENT, seed);

        Ok(Self {
            client,
            embedder,
            summary_prompt,
            index,
            summary: context::INITIAL_SUMMARY.to_string(),
            updated_at: None,
        })
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn fragment_count(&self) -> usize {
        self.index.len()
    }

    /// Index `content`, then ask the model for a new running summary
    pub async fn update_context(&mut self, content: &str, content_type: UnitKind) -> Result<()> {
        let vector = self.embedder.embed(content).await?;
        self.index.add(content, vector);

        let prompt = self.summary_prompt.render(&[
            ("current_summary", self.summary.as_str()),
            ("new_content", content),
            ("content_type", content_type.as_str()),
        ]);
        self.summary = self.client.complete(&prompt).await?;
        self.updated_at = Some(Utc::now());

        debug!(
            "Context updated with {} ({} fragments, summary {} chars)",
            content_type,
            self.index.len(),
            self.summary.len()
        );
        Ok(())
    }

    /// The `k` most similar fragments to `query`, best first, `\n`-joined
    pub async fn get_relevant_context(&self, query: &str, k: usize) -> Result<String> {
        let vector = self.embedder.embed(query).await?;
        Ok(self.index.search(&vector, k).join("\n"))
    }

    /// Snapshot of the current state
    pub fn to_state(&self, documented_units: usize) -> ContextState {
        ContextState {
            version: storage::STATE_VERSION,
            summary: self.summary.clone(),
            fragments: self.index.clone(),
            documented_units,
            embedder: self.embedder.name(),
            dimensions: self.embedder.dimensions(),
            updated_at: self.updated_at.unwrap_or_else(Utc::now),
        }
    }

    pub fn save_state(&self, store: &ProgressStore, documented_units: usize) -> Result<()> {
        store.save_context(&self.to_state(documented_units))
    }

    /// Restore persisted state; `Ok(false)` when there is none.
    ///
    /// Documentation saved without any context state is indexed on top of
    /// the initial state.
    ///
    /// Vectors from a different embedder are recomputed. Documentation
    /// entries saved after the last context save (a crash between the two
    /// writes) are indexed without a model call; the summary is kept.
    pub async fn load_state(
        &mut self,
        store: &ProgressStore,
        documentation: &DocumentationStore,
    ) -> Result<bool> {
        let Some(state) = store.load_context()? else {
            if documentation.is_empty() {
                return Ok(false);
            }
            // Crash before the first context write
            warn!(
                "No context state for {} documented unit(s); re-indexing without summary update",
                documentation.len()
            );
            for (_, doc) in documentation.iter() {
                let vector = self.embedder.embed(doc).await?;
                self.index.add(doc, vector);
            }
            return Ok(true);
        };

        let mut index = state.fragments;
        let current = self.embedder.name();
        let dims = self.embedder.dimensions();
        if state.embedder != current || (dims != 0 && state.dimensions != dims) {
            info!(
                "Embedder changed ({} -> {}); re-embedding {} fragments",
                state.embedder,
                current,
                index.len()
            );
            for fragment in index.fragments_mut() {
                fragment.vector = self.embedder.embed(&fragment.text).await?;
            }
        }

        if state.documented_units < documentation.len() {
            let missing = documentation.len() - state.documented_units;
            warn!(
                "Context state is {} unit(s) behind the documentation; re-indexing without summary update",
                missing
            );
            for (_, doc) in documentation.iter_from(state.documented_units) {
                let vector = self.embedder.embed(doc).await?;
                index.add(doc, vector);
            }
        } else if state.documented_units > documentation.len() {
            warn!(
                "Context state records {} units but documentation has {}",
                state.documented_units,
                documentation.len()
            );
        }

        self.index = index;
        self.summary = state.summary;
        self.updated_at = Some(state.updated_at);
        Ok(true)
    }
}
