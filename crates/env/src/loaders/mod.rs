//! Property source loaders
//!
//! Loaders turn a declarative [`SourceKind`] into concrete property sources
//! during bootstrap.

mod args;
mod composite;
mod env;
mod file;

pub use args::ArgsLoader;
pub use composite::CompositeLoader;
pub use env::EnvLoader;
pub use file::FileLoader;

use crate::error::EnvResult;
use crate::source::{PropertySource, SourceKind};
use async_trait::async_trait;
use std::sync::Arc;

/// Property source loader trait
#[async_trait]
pub trait PropertySourceLoader: Send + Sync {
    /// Load the property sources described by `kind`.
    ///
    /// `env_name` is the name of the environment being built; it selects
    /// environment-specific files.
    async fn load(&self, kind: &SourceKind, env_name: &str)
    -> EnvResult<Vec<Arc<dyn PropertySource>>>;

    /// Check if the loader supports the given source kind
    fn supports(&self, kind: &SourceKind) -> bool;
}
