//! Environment error types

use std::path::PathBuf;
use thiserror::Error;

/// Standard result type for environment operations
pub type EnvResult<T> = Result<T, EnvError>;

/// Environment error type
///
/// A key that is missing everywhere is not an error: lookups report it as
/// `Ok(None)`. Resource and scan I/O failures are absorbed by the
/// environment and never show up here either.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    /// A property was found but its value cannot be converted
    #[error("Cannot convert property '{key}' to {expected}: {message}")]
    Conversion {
        /// Property key as requested by the caller
        key: String,
        /// Name of the requested type
        expected: String,
        /// Conversion failure detail
        message: String,
    },

    /// A `${...}` placeholder refers to a missing key and has no default
    #[error("Could not resolve placeholder '${{{placeholder}}}' in property '{key}'")]
    UnresolvedPlaceholder {
        /// Property whose value contains the placeholder
        key: String,
        /// Placeholder expression without the `${` `}` delimiters
        placeholder: String,
    },

    /// Placeholder expansion nested too deeply (usually a reference cycle)
    #[error("Placeholder expansion for property '{key}' exceeded the nesting limit")]
    PlaceholderDepth {
        /// Property being expanded
        key: String,
    },

    /// Property source file not found
    #[error("Property source file not found: {path}")]
    FileNotFound {
        /// Path to the file
        path: PathBuf,
    },

    /// Property source file could not be read
    #[error("Failed to read property source file {path}: {message}")]
    FileRead {
        /// Path to the file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Property source content could not be parsed
    #[error("Failed to parse property source {path}: {message}")]
    Parse {
        /// Path (or inline source name) being parsed
        path: PathBuf,
        /// Error message describing the parse failure
        message: String,
    },

    /// Source format not supported
    #[error("Property source format not supported: {format}")]
    FormatNotSupported {
        /// Format that is not supported
        format: String,
    },

    /// Generic property source failure
    #[error("Property source error: {message}")]
    Source {
        /// Error message
        message: String,
        /// Origin of the failing source
        origin: String,
    },
}

impl EnvError {
    /// Create a conversion error
    pub fn conversion(
        key: impl Into<String>,
        expected: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Conversion {
            key: key.into(),
            expected: expected.into(),
            message: message.into(),
        }
    }

    /// Create an unresolved placeholder error
    pub fn unresolved_placeholder(key: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self::UnresolvedPlaceholder {
            key: key.into(),
            placeholder: placeholder.into(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a file read error
    pub fn file_read(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::FileRead {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a format not supported error
    pub fn format_not_supported(format: impl Into<String>) -> Self {
        Self::FormatNotSupported {
            format: format.into(),
        }
    }

    /// Create a source error
    pub fn source_error(message: impl Into<String>, origin: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
            origin: origin.into(),
        }
    }

    /// Check if the error comes from a present-but-invalid property value
    pub fn is_conversion(&self) -> bool {
        matches!(
            self,
            EnvError::Conversion { .. }
                | EnvError::UnresolvedPlaceholder { .. }
                | EnvError::PlaceholderDepth { .. }
        )
    }

    /// Check if error is due to a missing source
    pub fn is_missing_source(&self) -> bool {
        matches!(self, EnvError::FileNotFound { .. })
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            EnvError::Conversion { .. }
            | EnvError::UnresolvedPlaceholder { .. }
            | EnvError::PlaceholderDepth { .. } => ErrorCategory::Value,
            EnvError::FileNotFound { .. } => ErrorCategory::NotFound,
            EnvError::FileRead { .. } => ErrorCategory::Io,
            EnvError::Parse { .. } | EnvError::FormatNotSupported { .. } => ErrorCategory::Parse,
            EnvError::Source { .. } => ErrorCategory::Operation,
        }
    }
}

/// Error category for grouping errors
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Property value cannot be used as requested
    Value,
    /// Source not found
    NotFound,
    /// I/O error
    Io,
    /// Parse error
    Parse,
    /// Operation error
    Operation,
}
