//! Error types for the eviction engine

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for eviction and reclamation operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Size or access time could not be read for an entry, typically because
    /// it was deleted concurrently or is unreadable.
    #[error("failed to read metadata for cache entry {}", path.display())]
    #[diagnostic(
        code(paddock::cache::metadata),
        help("The entry may have been removed by another process")
    )]
    Metadata {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// The entry that could not be inspected
        path: Box<Path>,
    },

    /// A cache backend could not list its entries.
    #[error("failed to enumerate cache entries under {}", path.display())]
    #[diagnostic(
        code(paddock::cache::enumeration),
        help("Check that the cache directory exists and is readable")
    )]
    Enumeration {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// The backend root that could not be listed
        path: Box<Path>,
    },

    /// An entry could not be removed, fully or partially.
    #[error("failed to delete cache entry {}", path.display())]
    #[diagnostic(
        code(paddock::cache::delete),
        help("The entry may be in use or permissions may have changed")
    )]
    Delete {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// The entry that could not be removed
        path: Box<Path>,
    },

    /// Volume capacity could not be determined for the cache volume.
    #[error("failed to query volume capacity for {}", path.display())]
    #[diagnostic(code(paddock::cache::capacity))]
    Capacity {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// The path whose volume was being queried
        path: Box<Path>,
    },
}

impl Error {
    /// Create a metadata read error for an entry
    #[must_use]
    pub fn metadata(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::Metadata {
            source,
            path: path.as_ref().into(),
        }
    }

    /// Create an enumeration error for a backend root
    #[must_use]
    pub fn enumeration(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::Enumeration {
            source,
            path: path.as_ref().into(),
        }
    }

    /// Create a delete error for an entry
    #[must_use]
    pub fn delete(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::Delete {
            source,
            path: path.as_ref().into(),
        }
    }

    /// Create a capacity query error for a volume
    #[must_use]
    pub fn capacity(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::Capacity {
            source,
            path: path.as_ref().into(),
        }
    }
}

/// Result type for eviction and reclamation operations
pub type Result<T> = std::result::Result<T, Error>;
