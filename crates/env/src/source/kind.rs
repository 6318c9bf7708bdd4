//! Declarative property source descriptions used during bootstrap

use super::order;
use crate::format::SourceFormat;
use std::fmt;
use std::path::PathBuf;

/// Where a property source comes from.
///
/// Loaders turn a `SourceKind` into concrete [`PropertySource`]s.
///
/// [`PropertySource`]: super::PropertySource
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// A single configuration file, format detected from the extension
    File(PathBuf),

    /// `application.<ext>` plus `application-<env name>.<ext>` from a directory
    Application {
        /// Directory holding the application files
        dir: PathBuf,
    },

    /// All process environment variables
    Env,

    /// Process environment variables with a prefix
    EnvWithPrefix(String),

    /// Command line arguments
    CommandLine(Vec<String>),

    /// Inline configuration text
    Inline {
        /// Name of the resulting property source
        name: String,
        /// Format of `content`
        format: SourceFormat,
        /// Configuration text
        content: String,
    },
}

impl SourceKind {
    /// Check if this source is file-based
    pub fn is_file_based(&self) -> bool {
        matches!(self, SourceKind::File(_) | SourceKind::Application { .. })
    }

    /// Check if this source is environment-based
    pub fn is_env_based(&self) -> bool {
        matches!(self, SourceKind::Env | SourceKind::EnvWithPrefix(_))
    }

    /// Check if this source is optional (can fail without error)
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            SourceKind::Env | SourceKind::EnvWithPrefix(_) | SourceKind::Application { .. }
        )
    }

    /// Default order of sources produced from this kind (higher wins)
    pub fn default_order(&self) -> i32 {
        match self {
            SourceKind::File(_) | SourceKind::Application { .. } => order::FILE,
            SourceKind::Env | SourceKind::EnvWithPrefix(_) => order::ENVIRONMENT,
            SourceKind::CommandLine(_) => order::COMMAND_LINE,
            SourceKind::Inline { .. } => order::INLINE,
        }
    }

    /// Short kind name for display
    pub fn kind_name(&self) -> &'static str {
        match self {
            SourceKind::File(_) => "file",
            SourceKind::Application { .. } => "application",
            SourceKind::Env => "environment",
            SourceKind::EnvWithPrefix(_) => "environment (prefixed)",
            SourceKind::CommandLine(_) => "command line",
            SourceKind::Inline { .. } => "inline",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::File(path) => write!(f, "file: {}", path.display()),
            SourceKind::Application { dir } => write!(f, "application files in {}", dir.display()),
            SourceKind::Env => write!(f, "environment variables"),
            SourceKind::EnvWithPrefix(prefix) => {
                write!(f, "environment variables (prefix: {prefix})")
            }
            SourceKind::CommandLine(args) => write!(f, "command line ({} args)", args.len()),
            SourceKind::Inline { name, format, .. } => write!(f, "inline {format}: {name}"),
        }
    }
}
