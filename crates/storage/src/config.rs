//! Cache directory resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Inputs for determining the cache root directory
#[derive(Debug, Clone)]
struct CacheInputs {
    paddock_cache_dir: Option<PathBuf>,
    xdg_cache_home: Option<PathBuf>,
    os_cache_dir: Option<PathBuf>,
    home_dir: Option<PathBuf>,
    temp_dir: PathBuf,
}

fn cache_root_from_inputs(inputs: CacheInputs) -> Result<PathBuf> {
    // Resolution order (first writable wins):
    // 1) PADDOCK_CACHE_DIR (explicit override)
    // 2) XDG_CACHE_HOME/paddock
    // 3) OS cache dir/paddock
    // 4) ~/.paddock/cache (legacy)
    // 5) TMPDIR/paddock/cache (fallback)
    let mut candidates: Vec<PathBuf> = Vec::new();

    if let Some(dir) = inputs
        .paddock_cache_dir
        .filter(|p| !p.as_os_str().is_empty())
    {
        candidates.push(dir);
    }
    if let Some(xdg) = inputs.xdg_cache_home {
        candidates.push(xdg.join("paddock"));
    }
    if let Some(os_cache) = inputs.os_cache_dir {
        candidates.push(os_cache.join("paddock"));
    }
    if let Some(home) = inputs.home_dir {
        candidates.push(home.join(".paddock/cache"));
    }
    candidates.push(inputs.temp_dir.join("paddock/cache"));

    for path in candidates {
        if path.exists() {
            // An existing directory may still be read-only; some CI
            // environments mount the cache location that way.
            if probe_writable(&path) {
                return Ok(path);
            }
            continue;
        }
        if std::fs::create_dir_all(&path).is_ok() {
            return Ok(path);
        }
        // Permission denied or other errors - try the next candidate
    }

    Err(Error::configuration(
        "failed to determine a writable cache directory",
    ))
}

fn probe_writable(path: &Path) -> bool {
    let probe = path.join(".write_probe");
    match std::fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&probe)
    {
        Ok(_) => {
            let _ = std::fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}

/// Resolve the root directory holding all of paddock's caches.
pub fn cache_root() -> Result<PathBuf> {
    let inputs = CacheInputs {
        paddock_cache_dir: std::env::var("PADDOCK_CACHE_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from),
        xdg_cache_home: std::env::var("XDG_CACHE_HOME")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from),
        os_cache_dir: dirs::cache_dir(),
        home_dir: dirs::home_dir(),
        temp_dir: std::env::temp_dir(),
    };
    cache_root_from_inputs(inputs)
}

/// Locations of the individual caches under the resolved root.
#[derive(Debug, Clone)]
pub struct CacheDirs {
    root: PathBuf,
}

impl CacheDirs {
    /// Use an explicit cache root.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve the cache root from the environment.
    pub fn discover() -> Result<Self> {
        Ok(Self::new(cache_root()?))
    }

    /// The cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Root of the OCI image cache.
    #[must_use]
    pub fn oci_root(&self) -> PathBuf {
        self.root.join("oci")
    }

    /// Root of the installer image cache.
    #[must_use]
    pub fn installer_root(&self) -> PathBuf {
        self.root.join("installers")
    }
}
