//! Map-reduce summarization for large files
//!
//! Map: one summary per chunk. Reduce: partial summaries are collapsed in
//! token-bounded batches until they fit a single reduce prompt (at most
//! `MAX_COLLAPSE_ROUNDS` rounds), then reduced once more into the final
//! summary.

use tracing::debug;

use crate::ai::prompt::PromptTemplate;
use crate::ai::{LlmClient, TokenCounter};
use crate::constants::analysis::MAX_COLLAPSE_ROUNDS;
use crate::types::Result;

const JOIN: &str = "\n\n";

pub struct Summarizer {
    client: LlmClient,
    map: PromptTemplate,
    reduce: PromptTemplate,
    counter: TokenCounter,
    token_max: usize,
}

impl Summarizer {
    pub fn new(
        client: LlmClient,
        map: PromptTemplate,
        reduce: PromptTemplate,
        token_max: usize,
    ) -> Self {
        Self {
            client,
            map,
            reduce,
            counter: TokenCounter::default(),
            token_max,
        }
    }

    /// Summarize `chunks` into one text
    pub async fn summarize(&self, chunks: &[String]) -> Result<String> {
        let mut summaries = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            debug!("Map {}/{} ({} chars)", i + 1, chunks.len(), chunk.len());
            let prompt = self.map.render(&[("text", chunk.as_str())]);
            summaries.push(self.client.complete(&prompt).await?);
        }

        let mut rounds = 0;
        while summaries.len() > 1
            && rounds < MAX_COLLAPSE_ROUNDS
            && !self
                .counter
                .fits_budget(&summaries.join(JOIN), self.token_max)
        {
            let batches = self.counter.batch_by_budget(&summaries, self.token_max);
            debug!(
                "Collapse round {}: {} summaries into {} batches",
                rounds + 1,
                summaries.len(),
                batches.len()
            );

            let mut collapsed = Vec::with_capacity(batches.len());
            for batch in batches {
                collapsed.push(self.reduce_text(&batch.join(JOIN)).await?);
            }
            summaries = collapsed;
            rounds += 1;
        }

        self.reduce_text(&summaries.join(JOIN)).await
    }

    async fn reduce_text(&self, text: &str) -> Result<String> {
        let prompt = self.reduce.render(&[("text", text)]);
        self.client.complete(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::prompt::PromptKind;
    use crate::ai::provider::testing::{ScriptedProvider, client};
    use std::sync::Arc;

    fn summarizer(provider: Arc<ScriptedProvider>, token_max: usize) -> Summarizer {
        Summarizer::new(
            client(provider),
            PromptTemplate::for_kind(PromptKind::Map, "MAP {text}").unwrap(),
            PromptTemplate::for_kind(PromptKind::Reduce, "REDUCE {text}").unwrap(),
            token_max,
        )
    }

    #[tokio::test]
    async fn test_map_then_single_reduce() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.respond_when("MAP", "part");
        provider.respond_when("REDUCE", "whole");

        let chunks = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let summary = summarizer(provider.clone(), 3000)
            .summarize(&chunks)
            .await
            .unwrap();

        assert_eq!(summary, "whole");
        assert_eq!(provider.count_containing("MAP"), 3);
        assert_eq!(provider.count_containing("REDUCE"), 1);
        assert!(provider.prompts()[3].contains("part\n\npart\n\npart"));
    }

    #[tokio::test]
    async fn test_collapses_over_budget() {
        let provider = Arc::new(ScriptedProvider::new());
        // Each map summary is 8 words of 2 tokens
        provider.respond_when("MAP", "alphabet alphabet alphabet alphabet alphabet alphabet alphabet alphabet");
        provider.respond_when("REDUCE", "short");

        let chunks: Vec<String> = (0..4).map(|i| format!("chunk {}", i)).collect();
        let summary = summarizer(provider.clone(), 40)
            .summarize(&chunks)
            .await
            .unwrap();

        assert_eq!(summary, "short");
        // Two batches of two summaries, then the final reduce
        assert_eq!(provider.count_containing("REDUCE"), 3);
    }

    #[tokio::test]
    async fn test_collapse_rounds_bounded() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.respond_when("MAP", "alphabet alphabet alphabet");
        provider.respond_when("REDUCE", "alphabet alphabet alphabet");

        let chunks: Vec<String> = (0..4).map(|i| format!("chunk {}", i)).collect();
        // Budget below a single summary: every collapse keeps four batches
        summarizer(provider.clone(), 1)
            .summarize(&chunks)
            .await
            .unwrap();

        assert_eq!(
            provider.count_containing("REDUCE"),
            4 * MAX_COLLAPSE_ROUNDS + 1
        );
    }
}
