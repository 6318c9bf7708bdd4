//! Property source definitions
//!
//! A property source is a named bag of configuration entries with an
//! `order`. Higher orders win during resolution; equal orders are decided by
//! registration order, later registrations winning.

mod env;
mod kind;
mod map;

pub use env::EnvVarPropertySource;
pub use kind::SourceKind;
pub use map::MapPropertySource;
pub(crate) use map::Entries;

use serde_json::Value;
use std::fmt;

/// Default orders for the built-in source kinds (higher wins)
pub mod order {
    /// Built-in defaults
    pub const DEFAULTS: i32 = -100;
    /// Configuration file
    pub const FILE: i32 = 0;
    /// Environment-specific configuration file (`application-<env>.*`)
    pub const PROFILE_FILE: i32 = 50;
    /// Process environment variables
    pub const ENVIRONMENT: i32 = 100;
    /// Command line arguments
    pub const COMMAND_LINE: i32 = 200;
    /// Inline configuration
    pub const INLINE: i32 = 0;
}

/// A named, prioritized collection of configuration entries.
///
/// Implementations must be safe to query from many threads at once. Sources
/// backed by live external state (like the process environment) synchronize
/// internally; the resolver takes no locks of its own.
pub trait PropertySource: Send + Sync + fmt::Debug {
    /// Unique name of this source within an environment
    fn name(&self) -> &str;

    /// Priority of this source (higher wins)
    fn order(&self) -> i32 {
        order::FILE
    }

    /// Raw value for `key`.
    ///
    /// An exact key match is preferred; otherwise the key is compared in its
    /// normalized form (see [`crate::key::normalize`]).
    fn get(&self, key: &str) -> Option<Value>;

    /// Whether this source holds a value for `key`
    fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// All keys of this source, as they were declared
    fn keys(&self) -> Vec<String>;
}
