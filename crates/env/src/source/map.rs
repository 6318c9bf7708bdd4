//! Immutable map-backed property source

use super::{PropertySource, order};
use crate::key;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;

/// Flattened entries plus a normalized-key index.
///
/// Among distinct keys that normalize to the same form, the first inserted
/// one answers normalized lookups; exact lookups always see their own key.
#[derive(Debug, Clone, Default)]
pub(crate) struct Entries {
    values: IndexMap<String, Value>,
    normalized: HashMap<String, String>,
}

impl Entries {
    pub(crate) fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        self.normalized
            .entry(key::normalize(&key))
            .or_insert_with(|| key.clone());
        self.values.insert(key, value);
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.values.get(key) {
            return Some(value);
        }
        self.normalized
            .get(&key::normalize(key))
            .and_then(|original| self.values.get(original))
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    /// Insert every leaf of `value`, joining object keys with `.`.
    /// Arrays and scalars are leaves.
    pub(crate) fn flatten_from(&mut self, prefix: &str, value: Value) {
        match value {
            Value::Object(obj) => {
                for (k, v) in obj {
                    let full_key = if prefix.is_empty() {
                        k
                    } else {
                        format!("{prefix}.{k}")
                    };
                    self.flatten_from(&full_key, v);
                }
            }
            leaf => {
                if !prefix.is_empty() {
                    self.insert(prefix, leaf);
                }
            }
        }
    }
}

/// Property source backed by a fixed set of entries.
///
/// Entries can only be added while the source is being built; once it is
/// handed to an environment it is read-only.
#[derive(Debug, Clone)]
pub struct MapPropertySource {
    name: String,
    order: i32,
    entries: Entries,
}

impl MapPropertySource {
    /// Create an empty source
    pub fn new(name: impl Into<String>, order: i32) -> Self {
        Self {
            name: name.into(),
            order,
            entries: Entries::default(),
        }
    }

    /// Create a source from a nested JSON document.
    ///
    /// Objects are flattened into dotted keys, so `{"db": {"port": 5432}}`
    /// yields the entry `db.port = 5432`.
    pub fn from_value(name: impl Into<String>, order: i32, value: Value) -> Self {
        let mut source = Self::new(name, order);
        source.entries.flatten_from("", value);
        source
    }

    /// Create a source from flat key/value pairs
    pub fn from_pairs<K, V, I>(name: impl Into<String>, order: i32, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut source = Self::new(name, order);
        for (k, v) in pairs {
            source.entries.insert(k, v.into());
        }
        source
    }

    /// Create a source from command line arguments.
    ///
    /// Accepts `--key=value`, `-Dkey=value` and bare `--flag` (stored as
    /// `true`). Anything else is ignored.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut source = Self::new("command-line", order::COMMAND_LINE);
        for arg in args {
            let arg = arg.as_ref();
            let Some(body) = arg.strip_prefix("--").or_else(|| arg.strip_prefix("-D")) else {
                continue;
            };
            match body.split_once('=') {
                Some((k, v)) if !k.is_empty() => source.entries.insert(k, Value::from(v)),
                None if !body.is_empty() => source.entries.insert(body, Value::Bool(true)),
                _ => {}
            }
        }
        source
    }

    /// Add an entry
    #[must_use = "builder methods must be chained or built"]
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key, value.into());
        self
    }

    /// Override the order
    #[must_use = "builder methods must be chained or built"]
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the source has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn contains_key(&self, key: &str) -> bool {
        self.entries.get(key).is_some()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_flattens_objects() {
        let source = MapPropertySource::from_value(
            "app",
            0,
            json!({
                "db": {"host": "localhost", "port": 5432},
                "tags": ["a", "b"],
                "debug": true
            }),
        );

        assert_eq!(source.get("db.host"), Some(json!("localhost")));
        assert_eq!(source.get("db.port"), Some(json!(5432)));
        assert_eq!(source.get("tags"), Some(json!(["a", "b"])));
        assert_eq!(source.get("debug"), Some(json!(true)));
        assert_eq!(source.get("db"), None);
        assert_eq!(source.len(), 4);
    }

    #[test]
    fn test_normalized_lookup() {
        let source = MapPropertySource::new("app", 0).with_entry("server.max-connections", 10);

        assert!(source.contains_key("server.max-connections"));
        assert!(source.contains_key("SERVER_MAX_CONNECTIONS"));
        assert!(source.contains_key("server.max_connections"));
        assert!(!source.contains_key("server.max"));
    }

    #[test]
    fn test_exact_match_beats_normalized_match() {
        let source = MapPropertySource::new("app", 0)
            .with_entry("foo.bar-baz", "dotted")
            .with_entry("FOO_BAR_BAZ", "env-style");

        assert_eq!(source.get("foo.bar-baz"), Some(json!("dotted")));
        assert_eq!(source.get("FOO_BAR_BAZ"), Some(json!("env-style")));
        // neither spelling matches literally, first inserted answers
        assert_eq!(source.get("foo_bar.baz"), Some(json!("dotted")));
    }

    #[test]
    fn test_from_args() {
        let source = MapPropertySource::from_args([
            "--server.port=9090",
            "-Ddb.host=remote",
            "--verbose",
            "positional",
            "--=ignored",
        ]);

        assert_eq!(source.name(), "command-line");
        assert_eq!(source.order(), order::COMMAND_LINE);
        assert_eq!(source.get("server.port"), Some(json!("9090")));
        assert_eq!(source.get("db.host"), Some(json!("remote")));
        assert_eq!(source.get("verbose"), Some(json!(true)));
        assert_eq!(source.len(), 3);
    }

    #[test]
    fn test_keys_keep_declaration_order() {
        let source = MapPropertySource::from_pairs("p", 0, [("b", 1), ("a", 2), ("c", 3)]);
        assert_eq!(source.keys(), vec!["b", "a", "c"]);
    }
}
