//! Composite loader that dispatches to the first capable loader

use super::{ArgsLoader, EnvLoader, FileLoader, PropertySourceLoader};
use crate::error::{EnvError, EnvResult};
use crate::source::{PropertySource, SourceKind};
use async_trait::async_trait;
use std::sync::Arc;

/// Composite loader that combines multiple loaders
#[derive(Clone)]
pub struct CompositeLoader {
    loaders: Vec<Arc<dyn PropertySourceLoader>>,
}

impl std::fmt::Debug for CompositeLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeLoader")
            .field("loaders", &format!("{} loaders", self.loaders.len()))
            .finish()
    }
}

impl CompositeLoader {
    /// Create a new composite loader
    pub fn new() -> Self {
        Self {
            loaders: Vec::new(),
        }
    }

    /// Add a loader
    #[must_use = "builder methods must be chained or built"]
    pub fn add_loader<L: PropertySourceLoader + 'static>(mut self, loader: L) -> Self {
        self.loaders.push(Arc::new(loader));
        self
    }

    /// Add a loader (Arc version)
    #[must_use = "builder methods must be chained or built"]
    pub fn add_shared_loader(mut self, loader: Arc<dyn PropertySourceLoader>) -> Self {
        self.loaders.push(loader);
        self
    }

    /// Create with the file, environment and command line loaders
    pub fn default_loaders() -> Self {
        Self::new()
            .add_loader(FileLoader::new())
            .add_loader(EnvLoader::new())
            .add_loader(ArgsLoader::new())
    }

    /// Number of registered loaders
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    /// Whether no loader is registered
    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    fn get_loader_for(&self, kind: &SourceKind) -> Option<&Arc<dyn PropertySourceLoader>> {
        self.loaders.iter().find(|loader| loader.supports(kind))
    }
}

impl Default for CompositeLoader {
    fn default() -> Self {
        Self::default_loaders()
    }
}

#[async_trait]
impl PropertySourceLoader for CompositeLoader {
    async fn load(
        &self,
        kind: &SourceKind,
        env_name: &str,
    ) -> EnvResult<Vec<Arc<dyn PropertySource>>> {
        match self.get_loader_for(kind) {
            Some(loader) => loader.load(kind, env_name).await,
            None => Err(EnvError::source_error(
                format!("No loader supports source type: {}", kind.kind_name()),
                kind.to_string(),
            )),
        }
    }

    fn supports(&self, kind: &SourceKind) -> bool {
        self.get_loader_for(kind).is_some()
    }
}
