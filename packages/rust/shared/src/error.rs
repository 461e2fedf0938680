//! Error types for instructgen.
//!
//! Library crates use [`InstructGenError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all instructgen operations.
#[derive(Debug, thiserror::Error)]
pub enum InstructGenError {
    /// The template listing could not be retrieved (network failure or non-2xx).
    #[error("failed to fetch templates: {reason}")]
    CatalogFetch { reason: String },

    /// A single template's content could not be retrieved.
    #[error("failed to fetch {template}: {reason}")]
    ContentFetch { template: String, reason: String },

    /// Templates and contents handed to the merge engine are not aligned.
    #[error("merge input mismatch: {templates} templates but {contents} contents")]
    MergeInputMismatch { templates: usize, contents: usize },

    /// Generation was requested with nothing selected.
    #[error("no templates selected: select at least one template to generate instructions")]
    EmptySelection,

    /// A requested template name is not present in the catalog.
    #[error("unknown template: {name}")]
    UnknownTemplate { name: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Durable storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (malformed listing, bad record, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, InstructGenError>;

impl InstructGenError {
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

    /// Create a catalog fetch error carrying the transport-level reason.
    pub fn catalog_fetch(reason: impl Into<String>) -> Self {
        Self::CatalogFetch {
            reason: reason.into(),
        }
    }

    /// Create a content fetch error for the named template.
    pub fn content_fetch(template: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ContentFetch {
            template: template.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
