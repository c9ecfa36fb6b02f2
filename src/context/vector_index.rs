//! In-memory similarity index over context fragments

use serde::{Deserialize, Serialize};

use crate::ai::cosine_similarity;

/// One indexed text fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    pub vector: Vec<f32>,
}

/// Append-only list of fragments searched by cosine similarity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorIndex {
    fragments: Vec<Fragment>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, text: impl Into<String>, vector: Vec<f32>) {
        self.fragments.push(Fragment {
            text: text.into(),
            vector,
        });
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn fragments_mut(&mut self) -> &mut [Fragment] {
        &mut self.fragments
    }

    /// Texts of the `k` fragments most similar to `query`, best first.
    /// Equal scores keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<&str> {
        let mut scored: Vec<(usize, f32)> = self
            .fragments
            .iter()
            .enumerate()
            .map(|(i, f)| (i, cosine_similarity(query, &f.vector)))
            .collect();

        // Stable sort keeps insertion order among ties
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        scored
            .into_iter()
            .take(k)
            .map(|(i, _)| self.fragments[i].text.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_orders_by_similarity() {
        let mut index = VectorIndex::new();
        index.add("x axis", vec![1.0, 0.0]);
        index.add("y axis", vec![0.0, 1.0]);
        index.add("diagonal", vec![1.0, 1.0]);

        assert_eq!(index.search(&[0.9, 0.1], 2), vec!["x axis", "diagonal"]);
        assert_eq!(index.search(&[0.0, 1.0], 1), vec!["y axis"]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut index = VectorIndex::new();
        index.add("first", vec![1.0, 0.0]);
        index.add("second", vec![1.0, 0.0]);
        index.add("third", vec![1.0, 0.0]);

        assert_eq!(index.search(&[1.0, 0.0], 3), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_k_larger_than_index() {
        let mut index = VectorIndex::new();
        index.add("only", vec![1.0]);
        assert_eq!(index.search(&[1.0], 5), vec!["only"]);
        assert!(VectorIndex::new().search(&[1.0], 3).is_empty());
    }

    #[test]
    fn test_serializes_as_list() {
        let mut index = VectorIndex::new();
        index.add("a", vec![0.5]);
        let json = serde_json::to_value(&index).unwrap();
        assert!(json.is_array());
        let back: VectorIndex = serde_json::from_value(json).unwrap();
        assert_eq!(back, index);
    }
}
