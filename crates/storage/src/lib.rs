//! On-disk cache backends for paddock
//!
//! Two caches hold the large artifacts paddock downloads lazily:
//!
//! - [`OciImageCache`]: VM images distributed through OCI registries,
//!   materialised per reference with their layer blobs stored
//!   content-addressed.
//! - [`InstallerCache`]: OS installer images, one large file each.
//!
//! Both implement the [`paddock_cache::PrunableStorage`] contract so the
//! eviction engine can treat them uniformly. The OCI cache additionally
//! offers [`OciImageCache::collect_garbage`], an independent maintenance
//! operation that removes unreferenced blobs and abandoned partial pulls.

mod config;
mod entry;
mod error;
mod installer;
mod oci;

// Re-export error types at crate root
pub use error::{Error, Result};

// Re-export main types
pub use config::{CacheDirs, cache_root};
pub use entry::StoredArtifact;
pub use installer::InstallerCache;
pub use oci::{GcReport, ImageManifest, MANIFEST_FILE, OciImageCache};
