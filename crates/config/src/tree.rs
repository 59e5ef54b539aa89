//! Layered configuration tree.
//!
//! Responsibilities:
//! - Hold configuration as an ordered stack of named layers, each a flat map of
//!   `:`-delimited keys to string values.
//! - Answer lookups with "later layer wins" semantics.
//! - Provide section views rooted at a key prefix.
//!
//! Does NOT handle:
//! - Reading sources (see `sources`).
//! - Placeholder substitution (see `placeholder.rs`).
//!
//! Invariants:
//! - Key comparison is ASCII case-insensitive; the casing of the winning layer's
//!   key is preserved for display.
//! - Layers are never reordered once pushed.

use std::collections::{BTreeMap, BTreeSet};

/// Delimiter between key segments.
pub const KEY_DELIMITER: char = ':';

/// Name of the layer that receives values written through [`ConfigurationTree::set`].
const OVERRIDES_LAYER: &str = "overrides";

/// Join a section path and a relative key.
pub fn join_key(prefix: &str, key: &str) -> String {
    match (prefix.is_empty(), key.is_empty()) {
        (true, _) => key.to_string(),
        (_, true) => prefix.to_string(),
        _ => format!("{prefix}{KEY_DELIMITER}{key}"),
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    value: String,
}

#[derive(Debug, Clone)]
struct Layer {
    name: String,
    entries: BTreeMap<String, Entry>,
}

impl Layer {
    fn new(name: String) -> Self {
        Self {
            name,
            entries: BTreeMap::new(),
        }
    }

    fn insert(&mut self, key: String, value: String) {
        self.entries.insert(normalize(&key), Entry { key, value });
    }
}

/// Ordered, layered mapping from `:`-delimited keys to string values.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationTree {
    layers: Vec<Layer>,
}

impl ConfigurationTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new layer on top of the existing ones.
    pub fn push_layer<I, K, V>(&mut self, name: impl Into<String>, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut layer = Layer::new(name.into());
        for (key, value) in entries {
            layer.insert(key.into(), value.into());
        }
        self.layers.push(layer);
    }

    /// Set a single value in the top-most overrides layer.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let needs_layer = self
            .layers
            .last()
            .is_none_or(|layer| layer.name != OVERRIDES_LAYER);
        if needs_layer {
            self.layers.push(Layer::new(OVERRIDES_LAYER.to_string()));
        }
        if let Some(layer) = self.layers.last_mut() {
            layer.insert(key.into(), value.into());
        }
    }

    /// Look up a key, returning the value from the highest layer that defines it.
    pub fn get(&self, key: &str) -> Option<&str> {
        let normalized = normalize(key);
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.entries.get(&normalized))
            .map(|entry| entry.value.as_str())
    }

    /// Whether any layer defines `key` exactly.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// A view rooted at `path`.
    pub fn section(&self, path: &str) -> Section<'_> {
        Section {
            tree: self,
            path: path.trim_matches(KEY_DELIMITER).to_string(),
        }
    }

    /// Distinct immediate child segment names below `prefix`.
    pub fn children(&self, prefix: &str) -> Vec<String> {
        let needle = if prefix.is_empty() {
            String::new()
        } else {
            format!("{}{KEY_DELIMITER}", normalize(prefix))
        };
        let mut seen = BTreeSet::new();
        let mut children = Vec::new();
        for layer in &self.layers {
            for (normalized, entry) in &layer.entries {
                let Some(rest) = normalized.strip_prefix(&needle) else {
                    continue;
                };
                let segment_len = rest.find(KEY_DELIMITER).unwrap_or(rest.len());
                if segment_len == 0 || !seen.insert(rest[..segment_len].to_string()) {
                    continue;
                }
                // Entry keys and normalized keys share byte offsets (ASCII lowering only).
                let start = needle.len();
                children.push(entry.key.trim()[start..start + segment_len].to_string());
            }
        }
        children
    }

    /// Names of all layers, lowest precedence first.
    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|layer| layer.name.as_str())
    }

    /// Whether a layer with the given name has been pushed.
    pub fn has_layer(&self, name: &str) -> bool {
        self.layers.iter().any(|layer| layer.name == name)
    }

    /// The effective flattened view, keyed by the winning layer's key casing.
    pub fn flatten(&self) -> BTreeMap<String, String> {
        let mut winners: BTreeMap<String, &Entry> = BTreeMap::new();
        for layer in &self.layers {
            for (normalized, entry) in &layer.entries {
                winners.insert(normalized.clone(), entry);
            }
        }
        winners
            .into_values()
            .map(|entry| (entry.key.clone(), entry.value.clone()))
            .collect()
    }

    /// Number of distinct effective keys.
    pub fn len(&self) -> usize {
        self.layers
            .iter()
            .flat_map(|layer| layer.entries.keys())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Whether no layer defines any key.
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|layer| layer.entries.is_empty())
    }
}

/// Read-only view of a [`ConfigurationTree`] rooted at a key prefix.
#[derive(Debug, Clone)]
pub struct Section<'a> {
    tree: &'a ConfigurationTree,
    path: String,
}

impl<'a> Section<'a> {
    /// Full path of this section.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Look up `key` relative to this section.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.tree.get(&join_key(&self.path, key))
    }

    /// Look up `key`, treating empty values as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&'a str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    /// A nested section.
    pub fn section(&self, key: &str) -> Section<'a> {
        self.tree.section(&join_key(&self.path, key))
    }

    /// Whether the section has its own value or any key below it.
    pub fn exists(&self) -> bool {
        self.tree.contains_key(&self.path) || !self.tree.children(&self.path).is_empty()
    }

    /// The tree this section belongs to.
    pub fn tree(&self) -> &'a ConfigurationTree {
        self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> ConfigurationTree {
        let mut tree = ConfigurationTree::new();
        tree.push_layer(
            "file",
            [
                ("cloud:config:uri", "http://file:8888"),
                ("cloud:config:name", "from-file"),
                ("Logging:Level", "info"),
            ],
        );
        tree.push_layer("env", [("CLOUD:CONFIG:URI", "http://env:8888")]);
        tree
    }

    #[test]
    fn test_later_layer_wins() {
        let tree = tree();
        assert_eq!(tree.get("cloud:config:uri"), Some("http://env:8888"));
        assert_eq!(tree.get("cloud:config:name"), Some("from-file"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let tree = tree();
        assert_eq!(tree.get("logging:level"), Some("info"));
        assert_eq!(tree.get("CLOUD:Config:Name"), Some("from-file"));
    }

    #[test]
    fn test_section_lookup() {
        let tree = tree();
        let section = tree.section("cloud:config");
        assert!(section.exists());
        assert_eq!(section.get("uri"), Some("http://env:8888"));
        assert_eq!(section.get("missing"), None);
        assert!(!tree.section("vcap:services").exists());
    }

    #[test]
    fn test_nested_section() {
        let tree = tree();
        let nested = tree.section("cloud").section("config");
        assert_eq!(nested.path(), "cloud:config");
        assert_eq!(nested.get("name"), Some("from-file"));
    }

    #[test]
    fn test_children_are_distinct() {
        let tree = tree();
        let mut children = tree.children("cloud:config");
        children.sort();
        assert_eq!(children, vec!["name".to_string(), "uri".to_string()]);

        let mut roots = tree.children("");
        roots.sort_by_key(|s| s.to_ascii_lowercase());
        assert_eq!(roots, vec!["cloud".to_string(), "Logging".to_string()]);
    }

    #[test]
    fn test_set_goes_to_overrides_layer() {
        let mut tree = tree();
        tree.set("cloud:config:name", "override");
        tree.set("cloud:config:label", "main");
        assert_eq!(tree.get("cloud:config:name"), Some("override"));
        assert_eq!(
            tree.layer_names().collect::<Vec<_>>(),
            vec!["file", "env", "overrides"]
        );
    }

    #[test]
    fn test_flatten_uses_winning_value() {
        let flat = tree().flatten();
        assert_eq!(
            flat.get("CLOUD:CONFIG:URI").map(String::as_str),
            Some("http://env:8888")
        );
        assert_eq!(flat.len(), 3);
        assert_eq!(tree().len(), 3);
    }

    #[test]
    fn test_get_non_empty_filters_blank_values() {
        let mut tree = ConfigurationTree::new();
        tree.push_layer("mem", [("a:b", "")]);
        assert_eq!(tree.section("a").get("b"), Some(""));
        assert_eq!(tree.section("a").get_non_empty("b"), None);
    }
}
