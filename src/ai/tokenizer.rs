//! Token Counting and Budget Batching
//!
//! Provides token estimation for the map-reduce summarizer.
//!
//! ## Strategy
//! - Estimate token counts before a reduce prompt is built
//! - Split partial summaries into batches that fit one reduce prompt

/// Token estimation method
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TokenEstimator {
    /// Simple character-based estimation (4 chars = 1 token)
    CharBased,
    /// Code-aware estimation (accounts for syntax, keywords)
    #[default]
    CodeAware,
}

/// Token counter for context management
#[derive(Debug, Clone, Default)]
pub struct TokenCounter {
    estimator: TokenEstimator,
}

impl TokenCounter {
    pub fn new(estimator: TokenEstimator) -> Self {
        Self { estimator }
    }

    /// Estimate token count for a string
    pub fn count(&self, text: &str) -> usize {
        match self.estimator {
            TokenEstimator::CharBased => text.chars().count().div_ceil(4),
            TokenEstimator::CodeAware => self.count_code_aware(text),
        }
    }

    /// Code-aware counting
    /// - Punctuation and operators are individual tokens
    /// - Words cost roughly one token per four characters
    fn count_code_aware(&self, text: &str) -> usize {
        let mut tokens = 0;
        let mut word_len = 0;

        for ch in text.chars() {
            match ch {
                '(' | ')' | '{' | '}' | '[' | ']' | ';' | ':' | ',' | '.' | '+' | '-' | '*'
                | '/' | '=' | '<' | '>' | '!' | '&' | '|' | '@' | '#' | '$' | '%' | '^' | '~'
                | '?' | '\\' | '"' | '\'' => {
                    tokens += word_tokens(word_len);
                    word_len = 0;
                    tokens += 1;
                }
                c if c.is_whitespace() => {
                    tokens += word_tokens(word_len);
                    word_len = 0;
                }
                _ => word_len += 1,
            }
        }

        tokens += word_tokens(word_len);
        tokens
    }

    /// Check if content fits within token budget
    pub fn fits_budget(&self, text: &str, budget: usize) -> bool {
        self.count(text) <= budget
    }

    /// Group `texts` in order into batches whose token sum stays within
    /// `budget`. A single text over budget forms its own batch.
    pub fn batch_by_budget(&self, texts: &[String], budget: usize) -> Vec<Vec<String>> {
        let mut batches = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut current_tokens = 0;

        for text in texts {
            let tokens = self.count(text);
            if !current.is_empty() && current_tokens + tokens > budget {
                batches.push(std::mem::take(&mut current));
                current_tokens = 0;
            }
            current.push(text.clone());
            current_tokens += tokens;
        }

        if !current.is_empty() {
            batches.push(current);
        }
        batches
    }
}

/// Estimate tokens for a single word of `len` characters
fn word_tokens(len: usize) -> usize {
    match len {
        0 => 0,
        1..=4 => 1,
        5..=8 => 2,
        _ => len.div_ceil(4),
    }
}
