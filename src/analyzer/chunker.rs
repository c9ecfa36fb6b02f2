//! Text Chunker
//!
//! Recursive character splitter. Text is split on the first separator that
//! occurs in it (`"\n\n"`, then `"\n"`, then `" "`, then between characters);
//! the pieces are merged greedily into chunks of at most `chunk_size`
//! characters, carrying up to `chunk_overlap` characters of trailing pieces
//! into the next chunk. Pieces that are still too long are split again with
//! the next separator.

use std::collections::VecDeque;

use tracing::debug;

const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// Splits file content into bounded, overlapping chunks
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// `chunk_size` must be positive and larger than `chunk_overlap`;
    /// configuration validation enforces both.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
        }
    }

    /// Split `text` into chunks; empty or whitespace-only input yields none
    pub fn split(&self, text: &str) -> Vec<String> {
        let chunks = self.split_with(text, SEPARATORS);
        debug!(
            "Split {} chars into {} chunks (size {}, overlap {})",
            text.chars().count(),
            chunks.len(),
            self.chunk_size,
            self.chunk_overlap
        );
        chunks
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        // First separator present in the text; "" always matches
        let position = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(position).copied().unwrap_or("");
        let remaining = separators.get(position + 1..).unwrap_or(&[]);

        let splits: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|s| !s.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();

        for split in splits {
            if char_len(split) < self.chunk_size {
                fitting.push(split);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting, separator));
                fitting.clear();
            }

            if remaining.is_empty() {
                push_trimmed(&mut chunks, split);
            } else {
                chunks.extend(self.split_with(split, remaining));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting, separator));
        }

        chunks
    }

    /// Greedily join `splits` with `separator` into chunks within budget
    fn merge(&self, splits: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0;

        for &split in splits {
            let len = char_len(split);
            let joined_len = |total: usize, current: &VecDeque<&str>| {
                total + len + if current.is_empty() { 0 } else { sep_len }
            };

            if joined_len(total, &current) > self.chunk_size && !current.is_empty() {
                push_trimmed(&mut chunks, &join(&current, separator));

                // Keep at most `chunk_overlap` chars and make room for `split`
                while total > self.chunk_overlap
                    || (joined_len(total, &current) > self.chunk_size && total > 0)
                {
                    let Some(front) = current.pop_front() else {
                        break;
                    };
                    let removed = char_len(front) + if current.is_empty() { 0 } else { sep_len };
                    total = total.saturating_sub(removed);
                }
            }

            total += len + if current.is_empty() { 0 } else { sep_len };
            current.push_back(split);
        }

        if !current.is_empty() {
            push_trimmed(&mut chunks, &join(&current, separator));
        }

        chunks
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn join(parts: &VecDeque<&str>, separator: &str) -> String {
    parts.iter().copied().collect::<Vec<_>>().join(separator)
}

fn push_trimmed(chunks: &mut Vec<String>, chunk: &str) {
    let trimmed = chunk.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_input() {
        let splitter = TextSplitter::new(100, 10);
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("  \n\n \n").is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let splitter = TextSplitter::new(100, 10);
        assert_eq!(splitter.split("fn main() {}\n"), vec!["fn main() {}"]);
    }

    #[test]
    fn test_overlap_between_word_chunks() {
        let splitter = TextSplitter::new(15, 5);
        let chunks = splitter.split("one two three four five six seven eight nine ten");
        assert_eq!(
            chunks,
            vec![
                "one two three",
                "three four five",
                "five six seven",
                "seven eight",
                "eight nine ten",
            ]
        );
    }

    #[test]
    fn test_paragraphs_preferred() {
        let splitter = TextSplitter::new(30, 0);
        let text = "first paragraph here\n\nsecond paragraph here";
        assert_eq!(
            splitter.split(text),
            vec!["first paragraph here", "second paragraph here"]
        );
    }

    #[test]
    fn test_long_word_split_into_characters() {
        let splitter = TextSplitter::new(4, 0);
        let chunks = splitter.split("abcdefghij");
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_multibyte_characters() {
        let splitter = TextSplitter::new(3, 0);
        let chunks = splitter.split("ééééé");
        assert_eq!(chunks, vec!["ééé", "éé"]);
    }

    proptest! {
        #[test]
        fn prop_chunks_bounded_and_cover_words(
            words in prop::collection::vec("[a-z0-9]{1,8}", 0..80),
            breaks in prop::collection::vec(0u8..4, 0..80),
            chunk_size in 20usize..120,
            overlap_pct in 0usize..50,
        ) {
            let overlap = chunk_size * overlap_pct / 100;
            let mut text = String::new();
            for (i, word) in words.iter().enumerate() {
                if i > 0 {
                    text.push_str(match breaks.get(i).copied().unwrap_or(0) {
                        0 | 1 => " ",
                        2 => "\n",
                        _ => "\n\n",
                    });
                }
                text.push_str(word);
            }

            let chunks = TextSplitter::new(chunk_size, overlap).split(&text);

            for chunk in &chunks {
                prop_assert!(chunk.chars().count() <= chunk_size);
                prop_assert!(!chunk.is_empty());
                prop_assert!(text.contains(chunk.as_str()));
            }
            for word in &words {
                prop_assert!(chunks.iter().any(|c| c.contains(word.as_str())));
            }
            prop_assert_eq!(chunks.is_empty(), words.is_empty());
        }
    }
}
