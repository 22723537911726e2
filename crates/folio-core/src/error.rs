//! Error types for Folio.
//!
//! The public taxonomy mirrors what collaborators can observe:
//! [`Error::NotFound`], [`Error::InvalidDocument`] and [`Error::InvalidQuery`].
//! Path traversal attempts surface as `NotFound` so that callers cannot probe
//! the layout outside the corpus root.

use std::path::Path;

use thiserror::Error;

/// Result type alias for Folio operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Folio.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Path does not resolve to an existing, permitted node.
    #[error("Not found: {path}")]
    NotFound {
        /// The path as requested by the caller.
        path: String,
    },

    /// Node exists but could not be read or decoded.
    #[error("Invalid document '{path}': {source}")]
    InvalidDocument {
        /// The path as requested by the caller.
        path: String,
        /// Underlying read or decode failure.
        #[source]
        source: std::io::Error,
    },

    /// Query was rejected. Reserved; no query is rejected today.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// I/O error outside a per-document read.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path involved in the failed operation.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Parse error (configuration files, frontmatter deserialization).
    #[error("Parse error: {0}")]
    Parse(String),

    /// A long-running operation was cancelled before it completed.
    #[error("Operation cancelled: {0}")]
    Cancelled(&'static str),
}

impl Error {
    /// Creates a not-found error for the given request path.
    pub fn not_found(path: impl Into<String>) -> Self {
        Error::NotFound { path: path.into() }
    }

    /// Creates an invalid-document error wrapping an I/O failure.
    pub fn invalid_document(path: impl Into<String>, source: std::io::Error) -> Self {
        Error::InvalidDocument {
            path: path.into(),
            source,
        }
    }

    /// Creates an I/O error annotated with the path involved.
    pub fn io_with_path(source: std::io::Error, path: &Path) -> Self {
        Error::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse(message.into())
    }

    /// Returns `true` for [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Returns `true` for [`Error::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
