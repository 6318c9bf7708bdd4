//! Configuration module activation

use std::collections::BTreeSet;

/// A named, optionally loaded unit of configuration.
///
/// The gate only looks at the name; how configurations are loaded is up to
/// the container.
pub trait BeanConfiguration {
    /// Configuration name
    fn name(&self) -> &str;
}

impl BeanConfiguration for str {
    fn name(&self) -> &str {
        self
    }
}

impl BeanConfiguration for String {
    fn name(&self) -> &str {
        self
    }
}

/// Include/exclude rules deciding which configurations are active.
///
/// Rules are append-only. An excluded name is always inactive; a non-empty
/// include set acts as an allow-list; otherwise everything is active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationGate {
    includes: BTreeSet<String>,
    excludes: BTreeSet<String>,
}

impl ConfigurationGate {
    /// Create a gate that activates everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Add names to the allow-list
    pub fn add_includes<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes.extend(names.into_iter().map(Into::into));
    }

    /// Add names to the deny-list
    pub fn add_excludes<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(names.into_iter().map(Into::into));
    }

    /// Included names
    pub fn includes(&self) -> &BTreeSet<String> {
        &self.includes
    }

    /// Excluded names
    pub fn excludes(&self) -> &BTreeSet<String> {
        &self.excludes
    }

    /// Whether the named configuration is active
    pub fn is_active(&self, name: &str) -> bool {
        if self.excludes.contains(name) {
            return false;
        }
        self.includes.is_empty() || self.includes.contains(name)
    }
}
