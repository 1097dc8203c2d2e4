//! OS installer image cache
//!
//! Installer images are cached as single large files in one flat
//! directory; each file is one prunable entry.

use crate::entry::StoredArtifact;
use paddock_cache::{Error, Prunable, PrunableStorage, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Cache of downloaded OS installer images.
#[derive(Debug, Clone)]
pub struct InstallerCache {
    root: PathBuf,
}

impl InstallerCache {
    /// Create a cache at the specified root directory.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl PrunableStorage for InstallerCache {
    fn prunables(&self) -> Result<Vec<Box<dyn Prunable>>> {
        if !self.root.exists() {
            // Nothing downloaded yet
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        let entries = fs::read_dir(&self.root).map_err(|e| Error::enumeration(e, &self.root))?;
        for entry in entries {
            let entry = entry.map_err(|e| Error::enumeration(e, &self.root))?;
            let file_type = entry
                .file_type()
                .map_err(|e| Error::enumeration(e, &self.root))?;
            if file_type.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();

        Ok(paths
            .into_iter()
            .map(|path| Box::new(StoredArtifact::new(path)) as Box<dyn Prunable>)
            .collect())
    }
}
