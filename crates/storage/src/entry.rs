//! Shared on-disk entry handle handed out by the cache backends

use chrono::{DateTime, Utc};
use paddock_cache::Prunable;
use std::fs;
use std::path::{Path, PathBuf};

/// A cached artifact on disk: a single file or a directory tree.
///
/// Size and access time are re-read from the filesystem on every call, so
/// the eviction engine always acts on current state rather than a snapshot
/// taken at enumeration time.
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    path: PathBuf,
}

impl StoredArtifact {
    /// Wrap an on-disk location as a prunable handle.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Prunable for StoredArtifact {
    fn path(&self) -> &Path {
        &self.path
    }

    fn accessed_at(&self) -> paddock_cache::Result<DateTime<Utc>> {
        let meta =
            fs::metadata(&self.path).map_err(|e| paddock_cache::Error::metadata(e, &self.path))?;
        // Volumes mounted noatime report no useful access time; the
        // modification time is the closest substitute.
        let stamp = meta
            .accessed()
            .or_else(|_| meta.modified())
            .map_err(|e| paddock_cache::Error::metadata(e, &self.path))?;
        Ok(stamp.into())
    }

    fn size_bytes(&self) -> paddock_cache::Result<u64> {
        let meta =
            fs::metadata(&self.path).map_err(|e| paddock_cache::Error::metadata(e, &self.path))?;
        if meta.is_file() {
            return Ok(meta.len());
        }

        let mut total = 0u64;
        for entry in walkdir::WalkDir::new(&self.path) {
            let entry = entry.map_err(|e| walk_error(&self.path, e))?;
            if entry.file_type().is_file() {
                let file_meta = entry.metadata().map_err(|e| walk_error(entry.path(), e))?;
                total = total.saturating_add(file_meta.len());
            }
        }
        Ok(total)
    }

    fn delete(&self) -> paddock_cache::Result<()> {
        let meta = fs::symlink_metadata(&self.path)
            .map_err(|e| paddock_cache::Error::delete(e, &self.path))?;
        if meta.is_dir() {
            fs::remove_dir_all(&self.path).map_err(|e| paddock_cache::Error::delete(e, &self.path))
        } else {
            fs::remove_file(&self.path).map_err(|e| paddock_cache::Error::delete(e, &self.path))
        }
    }
}

fn walk_error(path: &Path, err: walkdir::Error) -> paddock_cache::Error {
    let io = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("directory walk interrupted"));
    paddock_cache::Error::metadata(io, path)
}
