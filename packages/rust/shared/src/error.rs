//! Error types for InsolvencyCheck.
//!
//! Library crates use [`InsolvencyCheckError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! A collector falling back to empty evidence is not an error: see
//! [`crate::EvidenceGap`].

use std::path::PathBuf;

/// Top-level error type for all InsolvencyCheck operations.
#[derive(Debug, thiserror::Error)]
pub enum InsolvencyCheckError {
    /// Configuration loading or validation error (including a missing API key).
    #[error("config error: {message}")]
    Config { message: String },

    /// Input rejected before any network call.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The registry search returned no usable match for the company name.
    #[error("company not found: {query}")]
    NotFound { query: String },

    /// Transport failure or non-success status from an upstream service.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Upstream response body could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The document backend failed to lay out or serialize the report.
    #[error("render error: {0}")]
    Render(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, InsolvencyCheckError>;

impl InsolvencyCheckError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a not-found error for the given search query.
    pub fn not_found(query: impl Into<String>) -> Self {
        Self::NotFound {
            query: query.into(),
        }
    }

    /// Create an upstream error from any displayable message.
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a render error from any displayable message.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error ends the run with a user-facing "not found" message.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
