//! Error types for the cache backends

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for backend maintenance and configuration.
///
/// The [`paddock_cache::PrunableStorage`] contract methods use
/// [`paddock_cache::Error`] instead, so the eviction engine sees one error
/// type regardless of backend.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// I/O error during a backend operation
    #[error("I/O {operation} failed: {}", path.display())]
    #[diagnostic(
        code(paddock::storage::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error
        path: Box<Path>,
        /// Operation that failed (e.g., "read", "remove_file")
        operation: String,
    },

    /// An image manifest sidecar could not be parsed
    #[error("invalid image manifest at {}: {message}", path.display())]
    #[diagnostic(
        code(paddock::storage::manifest),
        help("The image may be corrupted; re-pull it to repair the cache")
    )]
    Manifest {
        /// Path of the offending manifest
        path: Box<Path>,
        /// Parse failure description
        message: String,
    },

    /// Cache directory configuration error
    #[error("cache configuration error: {message}")]
    #[diagnostic(code(paddock::storage::config))]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },
}

impl Error {
    /// Create an I/O error with path context
    #[must_use]
    pub fn io(source: std::io::Error, path: impl AsRef<Path>, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: path.as_ref().into(),
            operation: operation.into(),
        }
    }

    /// Create a manifest parse error
    #[must_use]
    pub fn manifest(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.as_ref().into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Result type for backend maintenance and configuration
pub type Result<T> = std::result::Result<T, Error>;
