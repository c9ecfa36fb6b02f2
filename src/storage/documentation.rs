//! Documentation Store
//!
//! Ordered mapping of relative path to generated documentation. Insertion
//! order is run order and is kept through serialization (a JSON object whose
//! key order equals insertion order). Entries are never overwritten.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentationStore {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl DocumentationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Presence test driving all skip/resume decisions
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Record `documentation` for `key`; returns false and keeps the
    /// existing entry if `key` is already present
    pub fn insert(&mut self, key: impl Into<String>, documentation: impl Into<String>) -> bool {
        let key = key.into();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, documentation.into()));
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&i| self.entries[i].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries from position `start` on, in insertion order
    pub fn iter_from(&self, start: usize) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .skip(start)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render every entry as a `path: documentation` section
    pub fn render_sections(&self) -> String {
        self.iter()
            .map(|(path, doc)| format!("{}: {}", path, doc))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl Serialize for DocumentationStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, doc) in &self.entries {
            map.serialize_entry(key, doc)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DocumentationStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StoreVisitor;

        impl<'de> Visitor<'de> for StoreVisitor {
            type Value = DocumentationStore;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping paths to documentation strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut store = DocumentationStore::new();
                while let Some((key, doc)) = access.next_entry::<String, String>()? {
                    store.insert(key, doc);
                }
                Ok(store)
            }
        }

        deserializer.deserialize_map(StoreVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DocumentationStore {
        let mut store = DocumentationStore::new();
        store.insert(".", "root folder");
        store.insert("main.rs", "entry point");
        store.insert("src", "");
        store.insert("src/lib.rs", "library");
        store
    }

    #[test]
    fn test_insert_never_overwrites() {
        let mut store = sample();
        assert!(!store.insert("main.rs", "changed"));
        assert_eq!(store.get("main.rs"), Some("entry point"));
        assert_eq!(store.len(), 4);
        assert!(store.contains("src"));
        assert!(!store.contains("src/main.rs"));
    }

    #[test]
    fn test_json_keeps_insertion_order() {
        let mut store = DocumentationStore::new();
        store.insert("zeta", "z");
        store.insert("alpha", "a");
        store.insert("mid", "m");

        let json = serde_json::to_string(&store).unwrap();
        assert_eq!(json, r#"{"zeta":"z","alpha":"a","mid":"m"}"#);

        let back: DocumentationStore = serde_json::from_str(&json).unwrap();
        assert_eq!(back.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(back, store);
    }

    #[test]
    fn test_rejects_non_string_values() {
        assert!(serde_json::from_str::<DocumentationStore>(r#"{"a": 1}"#).is_err());
        assert!(serde_json::from_str::<DocumentationStore>("[]").is_err());
    }

    #[test]
    fn test_render_sections_and_tail() {
        let store = sample();
        let rendered = store.render_sections();
        assert!(rendered.starts_with(".: root folder\n\nmain.rs: entry point"));
        assert_eq!(
            store.iter_from(2).map(|(k, _)| k).collect::<Vec<_>>(),
            vec!["src", "src/lib.rs"]
        );
    }
}
