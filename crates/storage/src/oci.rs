//! OCI-distributed VM image cache
//!
//! Images are materialised per reference, with their layer blobs stored
//! content-addressed so identical layers are shared across images:
//!
//! ```text
//! <cache root>/oci/
//! ├── blobs/
//! │   └── sha256/
//! │       └── abc123...               # shared layer blobs
//! └── images/
//!     └── ghcr.io/acme/base/v1/       # one materialised image per reference
//!         ├── image.json              # blob digests this image references
//!         └── disk.img ...
//! ```
//!
//! Each materialised image directory is one prunable entry. Blobs are not
//! prunable themselves; they are reclaimed by [`OciImageCache::collect_garbage`]
//! once no image references them.

use crate::entry::StoredArtifact;
use crate::{Error, Result};
use paddock_cache::{Prunable, PrunableStorage};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the manifest sidecar in a materialised image directory.
pub const MANIFEST_FILE: &str = "image.json";

/// Prefix of in-progress pull directories under `images/`.
const TEMP_PREFIX: &str = "tmp-";

/// Manifest sidecar written when an image is materialised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageManifest {
    /// Digest of the image configuration blob, if one is stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    /// Digests of the layer blobs this image references
    #[serde(default)]
    pub layers: Vec<String>,
}

impl ImageManifest {
    fn referenced_digests(&self) -> impl Iterator<Item = &str> {
        self.config.iter().chain(self.layers.iter()).map(|digest| {
            let (_, hash) = parse_digest(digest);
            hash
        })
    }
}

/// Result of one garbage collection run.
#[derive(Debug, Clone, Copy, Default)]
pub struct GcReport {
    /// Number of unreferenced blobs removed
    pub blobs_removed: usize,
    /// Total size of the removed blobs in bytes
    pub bytes_reclaimed: u64,
    /// Number of abandoned partial-pull directories removed
    pub temp_dirs_removed: usize,
}

/// Cache of VM images pulled from OCI registries.
#[derive(Debug, Clone)]
pub struct OciImageCache {
    root: PathBuf,
}

impl OciImageCache {
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

    /// Path for a cached blob, accepting `sha256:<hex>` or a bare hex digest.
    #[must_use]
    pub fn blob_path(&self, digest: &str) -> PathBuf {
        let (algo, hash) = parse_digest(digest);
        self.root.join("blobs").join(algo).join(hash)
    }

    fn images_root(&self) -> PathBuf {
        self.root.join("images")
    }

    fn blobs_root(&self) -> PathBuf {
        self.root.join("blobs").join("sha256")
    }

    /// Remove internal data no materialised image references: blobs whose
    /// digest appears in no `image.json`, and partial pulls abandoned by an
    /// interrupted download.
    ///
    /// This is a maintenance operation independent of the eviction
    /// policies; it never touches materialised images or referenced blobs.
    /// References are collected before anything is deleted, so an
    /// unreadable manifest aborts the run without removing a single blob.
    pub fn collect_garbage(&self) -> Result<GcReport> {
        let mut report = GcReport::default();
        let referenced = self.referenced_digests()?;

        let blobs_root = self.blobs_root();
        if blobs_root.exists() {
            let entries = fs::read_dir(&blobs_root)
                .map_err(|e| Error::io(e, &blobs_root, "read_dir"))?;
            for entry in entries {
                let entry = entry.map_err(|e| Error::io(e, &blobs_root, "read_dir"))?;
                let name = entry.file_name().to_string_lossy().into_owned();
                if referenced.contains(&name) {
                    continue;
                }
                let meta = entry
                    .metadata()
                    .map_err(|e| Error::io(e, entry.path(), "metadata"))?;
                if !meta.is_file() {
                    continue;
                }
                let path = entry.path();
                debug!(blob = %name, size = meta.len(), "removing unreferenced blob");
                fs::remove_file(&path).map_err(|e| Error::io(e, &path, "remove_file"))?;
                report.blobs_removed += 1;
                report.bytes_reclaimed = report.bytes_reclaimed.saturating_add(meta.len());
            }
        }

        let images_root = self.images_root();
        if images_root.exists() {
            sweep_temp_dirs(&images_root, &mut report)?;
        }

        info!(
            blobs_removed = report.blobs_removed,
            bytes_reclaimed = report.bytes_reclaimed,
            temp_dirs_removed = report.temp_dirs_removed,
            "OCI cache garbage collection finished"
        );
        Ok(report)
    }

    /// Digests referenced by any materialised image, as bare hex hashes.
    fn referenced_digests(&self) -> Result<HashSet<String>> {
        let mut referenced = HashSet::new();
        let images_root = self.images_root();
        if !images_root.exists() {
            return Ok(referenced);
        }

        let mut image_dirs = Vec::new();
        find_image_dirs(&images_root, &mut image_dirs)
            .map_err(|e| Error::io(e, &images_root, "read_dir"))?;

        for dir in image_dirs {
            let manifest_path = dir.join(MANIFEST_FILE);
            let content = fs::read_to_string(&manifest_path)
                .map_err(|e| Error::io(e, &manifest_path, "read"))?;
            let manifest: ImageManifest = serde_json::from_str(&content)
                .map_err(|e| Error::manifest(&manifest_path, e.to_string()))?;
            for hash in manifest.referenced_digests() {
                referenced.insert(hash.to_string());
            }
        }
        Ok(referenced)
    }
}

impl PrunableStorage for OciImageCache {
    fn prunables(&self) -> paddock_cache::Result<Vec<Box<dyn Prunable>>> {
        let images_root = self.images_root();
        if !images_root.exists() {
            // Nothing pulled yet
            return Ok(Vec::new());
        }

        let mut image_dirs = Vec::new();
        find_image_dirs(&images_root, &mut image_dirs)
            .map_err(|e| paddock_cache::Error::enumeration(e, &images_root))?;
        image_dirs.sort();

        Ok(image_dirs
            .into_iter()
            .map(|path| Box::new(StoredArtifact::new(path)) as Box<dyn Prunable>)
            .collect())
    }
}

/// Parse a digest string into (algorithm, hash).
///
/// Examples:
/// - "sha256:abc123" -> ("sha256", "abc123")
/// - "abc123" -> ("sha256", "abc123")
fn parse_digest(digest: &str) -> (&str, &str) {
    if let Some((algo, hash)) = digest.split_once(':') {
        (algo, hash)
    } else {
        ("sha256", digest)
    }
}

/// Collect materialised image directories: directories under `images/`
/// containing a manifest sidecar. In-progress pulls (`tmp-*`) are skipped,
/// and image payloads are never descended into.
fn find_image_dirs(dir: &Path, found: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX) {
            continue;
        }
        let path = entry.path();
        if path.join(MANIFEST_FILE).is_file() {
            found.push(path);
        } else {
            find_image_dirs(&path, found)?;
        }
    }
    Ok(())
}

fn sweep_temp_dirs(dir: &Path, report: &mut GcReport) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(e, dir, "read_dir"))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(e, dir, "read_dir"))?;
        let file_type = entry
            .file_type()
            .map_err(|e| Error::io(e, entry.path(), "metadata"))?;
        if !file_type.is_dir() {
            continue;
        }
        let path = entry.path();
        if entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX) {
            debug!(path = %path.display(), "removing abandoned partial pull");
            fs::remove_dir_all(&path).map_err(|e| Error::io(e, &path, "remove_dir_all"))?;
            report.temp_dirs_removed += 1;
        } else if !path.join(MANIFEST_FILE).is_file() {
            // Grouping directory (registry/repository); image payloads are
            // left alone.
            sweep_temp_dirs(&path, report)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn materialise_image(cache: &OciImageCache, reference: &str, layers: &[&str], payload: usize) {
        let dir = cache.root().join("images").join(reference);
        fs::create_dir_all(&dir).unwrap();
        let manifest = ImageManifest {
            config: None,
            layers: layers.iter().map(|l| format!("sha256:{l}")).collect(),
        };
        fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_vec(&manifest).unwrap(),
        )
        .unwrap();
        fs::write(dir.join("disk.img"), vec![0u8; payload]).unwrap();
    }

    fn store_blob(cache: &OciImageCache, hash: &str, size: usize) {
        let path = cache.blob_path(hash);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, vec![0u8; size]).unwrap();
    }

    #[test]
    fn test_blob_path_accepts_both_digest_forms() {
        let cache = OciImageCache::new(PathBuf::from("/cache/oci"));
        assert_eq!(
            cache.blob_path("sha256:abc123"),
            PathBuf::from("/cache/oci/blobs/sha256/abc123")
        );
        assert_eq!(
            cache.blob_path("abc123"),
            PathBuf::from("/cache/oci/blobs/sha256/abc123")
        );
    }

    #[test]
    fn test_enumerates_materialised_images() {
        let temp = TempDir::new().unwrap();
        let cache = OciImageCache::new(temp.path().to_path_buf());
        materialise_image(&cache, "ghcr.io/acme/base/v1", &["aaa"], 100);
        materialise_image(&cache, "ghcr.io/acme/base/v2", &["bbb"], 200);

        let prunables = cache.prunables().unwrap();
        assert_eq!(prunables.len(), 2);

        let sizes: Vec<u64> = prunables
            .iter()
            .map(|p| p.size_bytes().unwrap())
            .collect();
        // Payload plus the manifest sidecar, per image directory.
        assert!(sizes[0] > 100);
        assert!(sizes[1] > 200);
    }

    #[test]
    fn test_enumeration_skips_partial_pulls() {
        let temp = TempDir::new().unwrap();
        let cache = OciImageCache::new(temp.path().to_path_buf());
        materialise_image(&cache, "ghcr.io/acme/base/v1", &["aaa"], 10);
        fs::create_dir_all(cache.root().join("images/ghcr.io/acme/tmp-1234")).unwrap();

        assert_eq!(cache.prunables().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_root_enumerates_empty() {
        let temp = TempDir::new().unwrap();
        let cache = OciImageCache::new(temp.path().join("oci"));
        assert!(cache.prunables().unwrap().is_empty());
    }

    #[test]
    fn test_gc_removes_only_unreferenced_blobs() {
        let temp = TempDir::new().unwrap();
        let cache = OciImageCache::new(temp.path().to_path_buf());
        materialise_image(&cache, "ghcr.io/acme/base/v1", &["live"], 10);
        store_blob(&cache, "live", 100);
        store_blob(&cache, "orphan", 300);

        let report = cache.collect_garbage().unwrap();

        assert_eq!(report.blobs_removed, 1);
        assert_eq!(report.bytes_reclaimed, 300);
        assert!(cache.blob_path("live").exists());
        assert!(!cache.blob_path("orphan").exists());
    }

    #[test]
    fn test_gc_sweeps_abandoned_pulls() {
        let temp = TempDir::new().unwrap();
        let cache = OciImageCache::new(temp.path().to_path_buf());
        materialise_image(&cache, "ghcr.io/acme/base/v1", &["live"], 10);

        let partial = cache.root().join("images/ghcr.io/acme/tmp-91f2");
        fs::create_dir_all(&partial).unwrap();
        fs::write(partial.join("disk.img.part"), b"half a layer").unwrap();

        let report = cache.collect_garbage().unwrap();

        assert_eq!(report.temp_dirs_removed, 1);
        assert!(!partial.exists());
        // The materialised image is untouched.
        assert_eq!(cache.prunables().unwrap().len(), 1);
    }

    #[test]
    fn test_gc_aborts_on_corrupt_manifest_without_deleting() {
        let temp = TempDir::new().unwrap();
        let cache = OciImageCache::new(temp.path().to_path_buf());

        let dir = cache.root().join("images/ghcr.io/acme/base/v1");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MANIFEST_FILE), b"not json").unwrap();
        store_blob(&cache, "orphan", 300);

        let err = cache.collect_garbage().unwrap_err();
        assert!(matches!(err, Error::Manifest { .. }));
        // Conservative: with references unknown, nothing was removed.
        assert!(cache.blob_path("orphan").exists());
    }

    #[test]
    fn test_gc_on_empty_cache_reports_nothing() {
        let temp = TempDir::new().unwrap();
        let cache = OciImageCache::new(temp.path().join("oci"));

        let report = cache.collect_garbage().unwrap();
        assert_eq!(report.blobs_removed, 0);
        assert_eq!(report.bytes_reclaimed, 0);
        assert_eq!(report.temp_dirs_removed, 0);
    }

    #[test]
    fn test_manifest_config_digest_is_referenced() {
        let temp = TempDir::new().unwrap();
        let cache = OciImageCache::new(temp.path().to_path_buf());

        let dir = cache.root().join("images/ghcr.io/acme/base/v1");
        fs::create_dir_all(&dir).unwrap();
        let manifest = ImageManifest {
            config: Some("sha256:cfg".to_string()),
            layers: vec!["sha256:layer".to_string()],
        };
        fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_vec(&manifest).unwrap(),
        )
        .unwrap();
        store_blob(&cache, "cfg", 50);
        store_blob(&cache, "layer", 70);

        let report = cache.collect_garbage().unwrap();
        assert_eq!(report.blobs_removed, 0);
        assert!(cache.blob_path("cfg").exists());
        assert!(cache.blob_path("layer").exists());
    }
}
