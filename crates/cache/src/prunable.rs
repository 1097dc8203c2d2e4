//! Capability contracts between the eviction engine and cache backends

use crate::Result;
use chrono::{DateTime, Utc};
use std::path::Path;

/// One deletable cache unit: a file or directory tree on disk.
///
/// Size and access time are observations, not stored fields. Every call
/// re-queries the filesystem, so concurrent external mutation shows up as
/// a changed value or a [`crate::Error::Metadata`] failure instead of a
/// stale snapshot. Handles are created transiently during enumeration and
/// become invalid once [`Prunable::delete`] succeeds.
pub trait Prunable {
    /// Filesystem location of the entry. Uniquely identifies it within the
    /// owning storage.
    fn path(&self) -> &Path;

    /// When the entry was last accessed.
    fn accessed_at(&self) -> Result<DateTime<Utc>>;

    /// Current on-disk size of the entry in bytes.
    fn size_bytes(&self) -> Result<u64>;

    /// Remove the underlying filesystem object and all of its content.
    ///
    /// Irreversible: a successful delete frees the corresponding disk space
    /// immediately. Not idempotent; deleting an already-deleted entry
    /// fails with [`crate::Error::Delete`].
    fn delete(&self) -> Result<()>;
}

/// A cache backend whose entries can be pruned.
pub trait PrunableStorage {
    /// Enumerate all current entries of this backend.
    ///
    /// Returns the on-disk state at call time; the entry list is never
    /// cached across calls. Enumeration is read-only; a backend's
    /// independent garbage collection, if any, is a separate operation.
    fn prunables(&self) -> Result<Vec<Box<dyn Prunable>>>;
}
