//! Property resolution across prioritized sources
//!
//! Sources are consulted by `order`, highest first. Among equal orders the
//! most recently registered source wins. The first source holding a key
//! decides the outcome: if its value does not convert to the requested type
//! resolution fails rather than falling through to lower-priority sources.

use crate::convert::{self, ConversionService, DefaultConversionService};
use crate::error::{EnvError, EnvResult};
use crate::key;
use crate::source::PropertySource;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Maximum nesting of `${...}` placeholder expansion
const MAX_PLACEHOLDER_DEPTH: usize = 16;

/// Resolves typed property values from a set of property sources
#[derive(Clone)]
pub struct PropertyResolver {
    /// Sources by name, in registration order
    sources: IndexMap<String, Arc<dyn PropertySource>>,

    /// Sources in resolution order
    ordered: Vec<Arc<dyn PropertySource>>,

    conversion: Arc<dyn ConversionService>,
}

impl PropertyResolver {
    /// Create a resolver with the default conversion service
    pub fn new() -> Self {
        Self::with_conversion_service(Arc::new(DefaultConversionService))
    }

    /// Create a resolver with a custom conversion service
    pub fn with_conversion_service(conversion: Arc<dyn ConversionService>) -> Self {
        Self {
            sources: IndexMap::new(),
            ordered: Vec::new(),
            conversion,
        }
    }

    /// Replace the conversion service
    pub fn set_conversion_service(&mut self, conversion: Arc<dyn ConversionService>) {
        self.conversion = conversion;
    }

    /// Register a source, replacing any source with the same name.
    ///
    /// A replacement counts as the most recent registration. Returns the
    /// replaced source.
    pub fn add_source(
        &mut self,
        source: Arc<dyn PropertySource>,
    ) -> Option<Arc<dyn PropertySource>> {
        let name = source.name().to_string();
        let replaced = self.sources.shift_remove(&name);
        self.sources.insert(name, source);
        self.reorder();
        replaced
    }

    fn reorder(&mut self) {
        let mut ordered: Vec<_> = self.sources.values().rev().cloned().collect();
        // stable: equal orders keep most-recent-first
        ordered.sort_by_key(|source| Reverse(source.order()));
        self.ordered = ordered;
    }

    /// Source registered under `name`
    pub fn source(&self, name: &str) -> Option<&Arc<dyn PropertySource>> {
        self.sources.get(name)
    }

    /// Sources in resolution order (highest priority first)
    pub fn sources(&self) -> &[Arc<dyn PropertySource>] {
        &self.ordered
    }

    /// First source holding `key` and its raw value
    fn find(&self, key: &str) -> Option<(&Arc<dyn PropertySource>, Value)> {
        self.ordered
            .iter()
            .find_map(|source| source.get(key).map(|value| (source, value)))
    }

    /// Whether any source holds `key`
    pub fn contains(&self, key: &str) -> bool {
        self.ordered.iter().any(|source| source.contains_key(key))
    }

    /// Raw value of `key` with placeholders expanded, without conversion
    pub fn resolve_raw(&self, key: &str) -> EnvResult<Option<Value>> {
        match self.find(key) {
            Some((_, raw)) => self.expand(key, raw, 0).map(Some),
            None => Ok(None),
        }
    }

    /// Resolve `key` as `T`.
    ///
    /// Returns `Ok(None)` when no source holds the key, and
    /// [`EnvError::Conversion`] when the winning value does not convert.
    pub fn resolve<T>(&self, key: &str) -> EnvResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let Some((source, raw)) = self.find(key) else {
            tracing::trace!(key, "Property not found in any source");
            return Ok(None);
        };

        if key::is_sensitive(key) {
            tracing::trace!(key, source = source.name(), "Resolved property = [REDACTED]");
        } else {
            tracing::trace!(key, source = source.name(), value = %raw, "Resolved property");
        }

        let value = self.expand(key, raw, 0)?;
        convert::convert::<T>(&*self.conversion, &value)
            .map(Some)
            .map_err(|message| EnvError::conversion(key, std::any::type_name::<T>(), message))
    }

    /// Resolve `key` as `T`, falling back to `default` when absent.
    ///
    /// Conversion errors still propagate.
    pub fn resolve_or<T>(&self, key: &str, default: T) -> EnvResult<T>
    where
        T: DeserializeOwned,
    {
        Ok(self.resolve(key)?.unwrap_or(default))
    }

    /// Normalized keys lying under `prefix`, sorted and de-duplicated
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let prefix = key::normalize(prefix);
        let keys: BTreeSet<String> = self
            .ordered
            .iter()
            .flat_map(|source| source.keys())
            .map(|k| key::normalize(&k))
            .filter(|k| key::is_under(k, &prefix))
            .collect();
        keys.into_iter().collect()
    }

    /// Every property under `prefix`, keyed by the remainder of its
    /// normalized key. Values are the winning raw values, placeholders
    /// expanded.
    pub fn properties_under(&self, prefix: &str) -> EnvResult<BTreeMap<String, Value>> {
        let normalized_prefix = key::normalize(prefix);
        let mut result = BTreeMap::new();

        for full_key in self.keys_with_prefix(prefix) {
            let Some(value) = self.resolve_raw(&full_key)? else {
                continue;
            };
            let suffix = if normalized_prefix.is_empty() {
                full_key
            } else {
                full_key[normalized_prefix.len() + 1..].to_string()
            };
            result.insert(suffix, value);
        }

        Ok(result)
    }

    /// Expand `${key}` / `${key:default}` placeholders inside string values
    fn expand(&self, key: &str, value: Value, depth: usize) -> EnvResult<Value> {
        let Value::String(text) = value else {
            return Ok(value);
        };
        if !text.contains("${") {
            return Ok(Value::String(text));
        }
        if depth >= MAX_PLACEHOLDER_DEPTH {
            return Err(EnvError::PlaceholderDepth {
                key: key.to_string(),
            });
        }

        // a value that is exactly one placeholder keeps the referenced type
        if let Some(inner) = single_placeholder(&text) {
            return self.lookup_placeholder(key, inner, depth);
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text.as_str();
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                // unterminated: keep the remainder literally
                out.push_str(&rest[start..]);
                rest = "";
                break;
            };
            match self.lookup_placeholder(key, &after[..end], depth)? {
                Value::String(s) => out.push_str(&s),
                Value::Null => {}
                other => out.push_str(&other.to_string()),
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);

        Ok(Value::String(out))
    }

    fn lookup_placeholder(&self, key: &str, inner: &str, depth: usize) -> EnvResult<Value> {
        let (reference, default) = match inner.split_once(':') {
            Some((reference, default)) => (reference.trim(), Some(default)),
            None => (inner.trim(), None),
        };

        match self.find(reference) {
            Some((_, raw)) => self.expand(reference, raw, depth + 1),
            None => match default {
                Some(default) => self.expand(key, Value::String(default.to_string()), depth + 1),
                None => Err(EnvError::unresolved_placeholder(key, inner)),
            },
        }
    }
}

/// Body of `text` when it consists of exactly one `${...}` placeholder
fn single_placeholder(text: &str) -> Option<&str> {
    let inner = text.strip_prefix("${")?.strip_suffix('}')?;
    (!inner.contains('}') && !inner.contains("${")).then_some(inner)
}

impl Default for PropertyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PropertyResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyResolver")
            .field(
                "sources",
                &self
                    .ordered
                    .iter()
                    .map(|s| (s.name(), s.order()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
