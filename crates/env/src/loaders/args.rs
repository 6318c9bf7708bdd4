//! Command line loader

use super::PropertySourceLoader;
use crate::error::{EnvError, EnvResult};
use crate::source::{MapPropertySource, PropertySource, SourceKind};
use async_trait::async_trait;
use std::sync::Arc;

/// Loads [`SourceKind::CommandLine`]
#[derive(Debug, Clone, Default)]
pub struct ArgsLoader;

impl ArgsLoader {
    /// Create a new command line loader
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PropertySourceLoader for ArgsLoader {
    async fn load(
        &self,
        kind: &SourceKind,
        _env_name: &str,
    ) -> EnvResult<Vec<Arc<dyn PropertySource>>> {
        let SourceKind::CommandLine(args) = kind else {
            return Err(EnvError::source_error(
                "ArgsLoader only supports command line sources",
                kind.kind_name(),
            ));
        };
        let source = MapPropertySource::from_args(args);
        tracing::debug!(entries = source.len(), "Loaded command line arguments");
        Ok(vec![Arc::new(source)])
    }

    fn supports(&self, kind: &SourceKind) -> bool {
        matches!(kind, SourceKind::CommandLine(_))
    }
}
