//! File-based property source loader

use super::PropertySourceLoader;
use crate::error::{EnvError, EnvResult};
use crate::format::SourceFormat;
use crate::source::{MapPropertySource, PropertySource, SourceKind, order};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Base name of the application convention files
const APPLICATION: &str = "application";

/// Loads configuration files, the `application` file convention and inline
/// configuration text
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    /// Base directory for relative paths
    pub base_dir: Option<PathBuf>,
}

impl FileLoader {
    /// Create a new file loader
    pub fn new() -> Self {
        Self { base_dir: None }
    }

    /// Create a new file loader with base directory
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    /// Resolve path relative to base directory
    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base_dir) if path.is_relative() => base_dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Read and parse one file; `Ok(None)` if it does not exist
    async fn load_file(&self, path: &Path, order: i32) -> EnvResult<Option<MapPropertySource>> {
        let format = SourceFormat::from_path(path);
        if let SourceFormat::Unknown(_) = format {
            return Err(EnvError::format_not_supported(format.to_string()));
        }

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(EnvError::file_read(path, e.to_string())),
        };

        let value = format.parse(&content, path)?;
        // full path, so same-named files in different directories stay distinct
        let source = MapPropertySource::from_value(path.display().to_string(), order, value);
        tracing::debug!(
            path = %path.display(),
            entries = source.len(),
            order,
            "Loaded property source file"
        );
        Ok(Some(source))
    }

    /// Load `application.<ext>` and `application-<env>.<ext>` from `dir`
    async fn load_application(
        &self,
        dir: &Path,
        env_name: &str,
    ) -> EnvResult<Vec<Arc<dyn PropertySource>>> {
        let dir = self.resolve_path(dir);
        let mut sources: Vec<Arc<dyn PropertySource>> = Vec::new();

        let mut stems = vec![(APPLICATION.to_string(), order::FILE)];
        if !env_name.is_empty() {
            stems.push((format!("{APPLICATION}-{env_name}"), order::PROFILE_FILE));
        }

        for (stem, order) in stems {
            for format in &SourceFormat::PROBE_ORDER {
                for ext in format.extensions() {
                    let path = dir.join(format!("{stem}.{ext}"));
                    if let Some(source) = self.load_file(&path, order).await? {
                        sources.push(Arc::new(source));
                    }
                }
            }
        }

        if sources.is_empty() {
            tracing::debug!(dir = %dir.display(), "No application files found");
        }
        Ok(sources)
    }
}

#[async_trait]
impl PropertySourceLoader for FileLoader {
    async fn load(
        &self,
        kind: &SourceKind,
        env_name: &str,
    ) -> EnvResult<Vec<Arc<dyn PropertySource>>> {
        match kind {
            SourceKind::File(path) => {
                let resolved = self.resolve_path(path);
                match self.load_file(&resolved, kind.default_order()).await? {
                    Some(source) => Ok(vec![Arc::new(source)]),
                    None => Err(EnvError::file_not_found(resolved)),
                }
            }
            SourceKind::Application { dir } => self.load_application(dir, env_name).await,
            SourceKind::Inline {
                name,
                format,
                content,
            } => {
                let value = format.parse(content, Path::new(name))?;
                let source = MapPropertySource::from_value(name.clone(), kind.default_order(), value);
                Ok(vec![Arc::new(source)])
            }
            _ => Err(EnvError::source_error(
                "FileLoader does not support this source type",
                kind.kind_name(),
            )),
        }
    }

    fn supports(&self, kind: &SourceKind) -> bool {
        matches!(
            kind,
            SourceKind::File(_) | SourceKind::Application { .. } | SourceKind::Inline { .. }
        )
    }
}
