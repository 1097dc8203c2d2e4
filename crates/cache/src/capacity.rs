//! Volume capacity queries for the cache volume

use crate::{Error, Result};
use std::path::PathBuf;

/// Free-space figures for the volume holding the cache root.
///
/// Platforms report two numbers: a conservative figure for background
/// usage and a higher figure available to user-initiated, important work
/// (which may include purgeable space). Reclamation uses the maximum of
/// the two so it never evicts more than the platform would actually
/// require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeCapacity {
    /// Bytes available for general use
    pub available: u64,
    /// Bytes available for important usage (always >= `available` on
    /// platforms that distinguish the two)
    pub available_important: u64,
}

impl VolumeCapacity {
    /// The working estimate of free space: the maximum of the two figures.
    #[must_use]
    pub fn working_estimate(&self) -> u64 {
        self.available.max(self.available_important)
    }
}

/// Source of volume capacity readings.
///
/// Injectable so tests can supply deterministic values instead of the
/// real disk.
pub trait CapacityProbe {
    /// Read the current capacity of the volume.
    fn capacity(&self) -> Result<VolumeCapacity>;
}

/// Capacity probe backed by the real filesystem.
#[derive(Debug, Clone)]
pub struct FsCapacityProbe {
    path: PathBuf,
}

impl FsCapacityProbe {
    /// Create a probe for the volume holding `path`.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CapacityProbe for FsCapacityProbe {
    fn capacity(&self) -> Result<VolumeCapacity> {
        // `available_space` respects reserved blocks; `free_space` counts
        // everything not in use and is the higher, important-usage figure.
        let available =
            fs2::available_space(&self.path).map_err(|e| Error::capacity(e, &self.path))?;
        let available_important =
            fs2::free_space(&self.path).map_err(|e| Error::capacity(e, &self.path))?;
        Ok(VolumeCapacity {
            available,
            available_important,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_working_estimate_takes_maximum() {
        let capacity = VolumeCapacity {
            available: 5,
            available_important: 20,
        };
        assert_eq!(capacity.working_estimate(), 20);

        let capacity = VolumeCapacity {
            available: 7,
            available_important: 3,
        };
        assert_eq!(capacity.working_estimate(), 7);
    }

    #[test]
    fn test_fs_probe_reads_live_volume() {
        let temp = TempDir::new().unwrap();
        let probe = FsCapacityProbe::new(temp.path().to_path_buf());

        let capacity = probe.capacity().unwrap();
        // A writable temp dir always has some room; the important-usage
        // figure can never be below the conservative one.
        assert!(capacity.working_estimate() > 0);
        assert!(capacity.available_important >= capacity.available);
    }

    #[test]
    fn test_fs_probe_missing_path_fails() {
        let temp = TempDir::new().unwrap();
        let probe = FsCapacityProbe::new(temp.path().join("does-not-exist"));

        let err = probe.capacity().unwrap_err();
        assert!(matches!(err, Error::Capacity { .. }));
    }
}
