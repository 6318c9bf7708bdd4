//! Process environment property source

use super::{Entries, PropertySource, order};
use crate::key;
use parking_lot::RwLock;
use serde_json::Value;
use std::ffi::OsString;

/// Separator between the prefix and the rest of a variable name
const SEPARATOR: char = '_';

/// Property source backed by process environment variables.
///
/// Values are kept as raw strings; typing happens at resolution time through
/// the conversion service. The snapshot can be re-read with
/// [`refresh`](Self::refresh), so reads go through an internal lock.
#[derive(Debug)]
pub struct EnvVarPropertySource {
    name: String,
    order: i32,
    prefix: Option<String>,
    entries: RwLock<Entries>,
}

impl EnvVarPropertySource {
    /// Snapshot every environment variable
    pub fn new() -> Self {
        Self::from_vars(None, process_vars())
    }

    /// Snapshot the environment variables starting with `prefix`.
    ///
    /// The prefix and the separator after it are stripped, so with prefix
    /// `APP` the variable `APP_DB_PORT` answers `db.port`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::from_vars(Some(prefix.into()), process_vars())
    }

    /// Build the source from an explicit variable list
    pub fn from_vars<I>(prefix: Option<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let name = match &prefix {
            Some(p) => format!("environment:{p}"),
            None => "environment".to_string(),
        };
        let entries = collect(prefix.as_deref(), vars);
        Self {
            name,
            order: order::ENVIRONMENT,
            prefix,
            entries: RwLock::new(entries),
        }
    }

    /// Override the order
    #[must_use = "builder methods must be chained or built"]
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Configured prefix, if any
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Re-read the process environment
    pub fn refresh(&self) {
        self.refresh_from(process_vars());
    }

    /// Replace the snapshot with an explicit variable list
    pub fn refresh_from<I>(&self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let entries = collect(self.prefix.as_deref(), vars);
        tracing::debug!(
            source = %self.name,
            count = entries.len(),
            "Refreshed environment property source"
        );
        *self.entries.write() = entries;
    }
}

impl Default for EnvVarPropertySource {
    fn default() -> Self {
        Self::new()
    }
}

/// Process environment, skipping variables whose name or value is not
/// valid Unicode
fn process_vars() -> impl Iterator<Item = (String, String)> {
    unicode_vars(std::env::vars_os())
}

fn unicode_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(name, value)| match (name.into_string(), value.into_string()) {
            (Ok(name), Ok(value)) => Some((name, value)),
            (name, _) => {
                tracing::trace!(
                    name = %name.unwrap_or_else(|n| n.to_string_lossy().into_owned()),
                    "Skipping environment variable that is not valid Unicode"
                );
                None
            }
        })
}

/// Filter variables by prefix (case-insensitive) and strip it
fn collect<I>(prefix: Option<&str>, vars: I) -> Entries
where
    I: IntoIterator<Item = (String, String)>,
{
    let prefix = prefix.map(str::to_ascii_uppercase);
    let mut entries = Entries::default();

    for (name, value) in vars {
        let stripped = match &prefix {
            Some(prefix) => {
                let upper = name.to_ascii_uppercase();
                match upper.strip_prefix(prefix.as_str()) {
                    Some(rest) if rest.starts_with(SEPARATOR) => {
                        name[name.len() - rest.len()..].trim_start_matches(SEPARATOR)
                    }
                    _ => continue,
                }
            }
            None => name.as_str(),
        };

        if stripped.is_empty() {
            continue;
        }

        if key::is_sensitive(stripped) {
            tracing::trace!("Loading env property: {} = [REDACTED]", stripped);
        } else {
            tracing::trace!("Loading env property: {} = {}", stripped, value);
        }
        entries.insert(stripped, Value::String(value));
    }

    entries
}

impl PropertySource for EnvVarPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().get(key).cloned()
    }

    fn contains_key(&self, key: &str) -> bool {
        self.entries.read().get(key).is_some()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.read().keys()
    }
}
