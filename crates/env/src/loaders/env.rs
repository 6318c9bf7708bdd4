//! Environment variable loader

use super::PropertySourceLoader;
use crate::error::{EnvError, EnvResult};
use crate::source::{EnvVarPropertySource, PropertySource, SourceKind};
use async_trait::async_trait;
use std::sync::Arc;

/// Loads [`SourceKind::Env`] and [`SourceKind::EnvWithPrefix`] into live
/// environment variable sources
#[derive(Debug, Clone, Default)]
pub struct EnvLoader;

impl EnvLoader {
    /// Create a new environment loader
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PropertySourceLoader for EnvLoader {
    async fn load(
        &self,
        kind: &SourceKind,
        _env_name: &str,
    ) -> EnvResult<Vec<Arc<dyn PropertySource>>> {
        let source = match kind {
            SourceKind::Env => EnvVarPropertySource::new(),
            SourceKind::EnvWithPrefix(prefix) => EnvVarPropertySource::with_prefix(prefix.clone()),
            _ => {
                return Err(EnvError::source_error(
                    "EnvLoader only supports environment sources",
                    kind.kind_name(),
                ));
            }
        };
        tracing::debug!(source = source.name(), keys = source.keys().len(), "Loaded environment variables");
        Ok(vec![Arc::new(source)])
    }

    fn supports(&self, kind: &SourceKind) -> bool {
        kind.is_env_based()
    }
}
