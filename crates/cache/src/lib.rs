//! Cache eviction and reclamation for paddock
//!
//! This crate decides which cached artifacts to remove when disk usage has
//! to shrink. VM images and installer images are fetched lazily and can be
//! many gigabytes each, so the caches holding them grow without bound
//! unless actively reclaimed.
//!
//! Three policies are provided, all operating on the flattened entry set of
//! every registered cache backend:
//!
//! - [`Pruner::prune_older_than`]: remove entries last accessed before a
//!   cutoff timestamp.
//! - [`Pruner::prune_to_budget`]: remove least-recently-used entries until
//!   the entries kept fit a total size budget.
//! - [`Pruner::reclaim_if_needed`]: before an operation that needs
//!   guaranteed free space, compute the deficit against the volume's live
//!   capacity and evict least-recently-used entries until it is covered.
//!
//! Backends plug in through the [`PrunableStorage`] and [`Prunable`]
//! contracts; the engine itself never owns entry storage. Deleting a
//! multi-gigabyte directory tree is not transactional, so a pruning pass
//! fails fast and partially rather than atomically: deletions committed
//! before the first error are never rolled back.

mod capacity;
mod error;
mod prunable;
mod prune;

// Re-export error types at crate root
pub use error::{Error, Result};

// Re-export main types
pub use capacity::{CapacityProbe, FsCapacityProbe, VolumeCapacity};
pub use prunable::{Prunable, PrunableStorage};
pub use prune::Pruner;
