//! Prune the on-disk caches

use crate::cli::PruneArgs;
use crate::commands::CommandError;
use chrono::{Duration, Utc};
use paddock_cache::{FsCapacityProbe, Pruner};
use paddock_storage::{CacheDirs, InstallerCache, OciImageCache};
use tracing::info;

const BYTES_PER_GIB: u64 = 1024 * 1024 * 1024;

/// Run `paddock prune`.
pub fn run(args: &PruneArgs) -> Result<(), CommandError> {
    if args.older_than.is_none() && args.cache_budget.is_none() && !args.gc {
        return Err(CommandError::usage(
            "at least one pruning criteria must be specified",
            "pass --older-than <N>, --cache-budget <N> or both",
        ));
    }

    let dirs = CacheDirs::discover()?;

    if args.gc {
        let report = OciImageCache::new(dirs.oci_root()).collect_garbage()?;
        info!(
            blobs_removed = report.blobs_removed,
            bytes_reclaimed = report.bytes_reclaimed,
            "OCI cache garbage collected"
        );
    }

    let engine = build_pruner(&dirs);

    // Clean up cache entries based on last accessed date
    if let Some(days) = args.older_than {
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        engine.prune_older_than(cutoff)?;
    }

    // Clean up cache entries based on the imposed cache size limit and
    // each entry's last accessed date
    if let Some(budget) = args.cache_budget {
        engine.prune_to_budget(budget.saturating_mul(BYTES_PER_GIB))?;
    }

    Ok(())
}

fn build_pruner(dirs: &CacheDirs) -> Pruner {
    let mut pruner = Pruner::new(Box::new(FsCapacityProbe::new(dirs.root().to_path_buf())));
    pruner.register(Box::new(OciImageCache::new(dirs.oci_root())));
    pruner.register(Box::new(InstallerCache::new(dirs.installer_root())));
    pruner
}
