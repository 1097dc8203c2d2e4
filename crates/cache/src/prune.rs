//! Eviction policies over the registered cache backends

use crate::Result;
use crate::capacity::CapacityProbe;
use crate::prunable::{Prunable, PrunableStorage};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// The eviction and reclamation engine.
///
/// Aggregates the entries of every registered [`PrunableStorage`] into one
/// candidate set and applies one policy per invocation. The candidate set
/// is recomputed for every pass; nothing is deleted without first being
/// selected by exactly one policy pass.
///
/// All passes are fail-fast: the first metadata or delete error aborts the
/// remaining deletions of that pass and surfaces to the caller, with prior
/// deletions already committed.
pub struct Pruner {
    storages: Vec<Box<dyn PrunableStorage>>,
    capacity: Box<dyn CapacityProbe>,
}

impl Pruner {
    /// Create an engine with no registered storages.
    ///
    /// The capacity probe must read the volume that holds the caches; it is
    /// only consulted by [`Pruner::reclaim_if_needed`].
    #[must_use]
    pub fn new(capacity: Box<dyn CapacityProbe>) -> Self {
        Self {
            storages: Vec::new(),
            capacity,
        }
    }

    /// Register a cache backend for pruning.
    pub fn register(&mut self, storage: Box<dyn PrunableStorage>) {
        self.storages.push(storage);
    }

    /// Flatten the current entries of all registered storages, in
    /// enumeration order.
    fn candidates(&self) -> Result<Vec<Box<dyn Prunable>>> {
        let mut entries = Vec::new();
        for storage in &self.storages {
            entries.extend(storage.prunables()?);
        }
        Ok(entries)
    }

    /// Candidates paired with a snapshot of their access time, for the
    /// policies that order by recency.
    fn candidates_by_access(&self) -> Result<Vec<(DateTime<Utc>, Box<dyn Prunable>)>> {
        let mut entries = Vec::new();
        for entry in self.candidates()? {
            entries.push((entry.accessed_at()?, entry));
        }
        Ok(entries)
    }

    /// Delete every entry last accessed at or before `cutoff`.
    ///
    /// Eligibility depends only on each entry's own access time, so
    /// deletion order carries no meaning here.
    pub fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<()> {
        let mut deleted = 0u64;
        for entry in self.candidates()? {
            if entry.accessed_at()? <= cutoff {
                debug!(path = %entry.path().display(), "removing entry last accessed before cutoff");
                entry.delete()?;
                deleted += 1;
            }
        }
        info!(deleted, %cutoff, "age-based prune finished");
        Ok(())
    }

    /// Delete least-recently-useful entries until the entries kept fit
    /// `budget_bytes`.
    ///
    /// Entries are visited most-recently-used first. An entry whose size
    /// still fits the remaining budget is kept and paid for out of it; an
    /// entry that does not fit is marked for deletion and its cost is not
    /// charged. Because a rejected entry never consumes budget, a smaller,
    /// older entry later in the walk can still be kept after a larger,
    /// fresher one was dropped. This is a deliberate greedy pack, not a
    /// prefix cutoff and not a knapsack optimum.
    pub fn prune_to_budget(&self, budget_bytes: u64) -> Result<()> {
        let mut entries = self.candidates_by_access()?;
        // Most recently used first; stable, so ties keep enumeration order.
        entries.sort_by(|a, b| b.0.cmp(&a.0));

        let mut remaining = budget_bytes;
        let mut doomed: Vec<Box<dyn Prunable>> = Vec::new();

        for (_, entry) in entries {
            let size = entry.size_bytes()?;
            if size <= remaining {
                remaining -= size;
            } else {
                debug!(path = %entry.path().display(), size, "entry does not fit cache budget");
                doomed.push(entry);
            }
        }

        let deleted = doomed.len();
        for entry in doomed {
            entry.delete()?;
        }
        info!(deleted, budget_bytes, "budget-based prune finished");
        Ok(())
    }

    /// Make sure at least `required_bytes` of volume capacity is available,
    /// evicting least-recently-used entries if it is not.
    ///
    /// A zero or unreadable capacity reading is a soft anomaly: reclaiming
    /// against an unknown baseline risks both over- and under-eviction, so
    /// the pass records a warning and does nothing.
    pub fn reclaim_if_needed(&self, required_bytes: u64) -> Result<()> {
        let capacity = match self.capacity.capacity() {
            Ok(capacity) => capacity,
            Err(err) => {
                warn!(%err, "volume capacity unreadable, skipping reclamation");
                return Ok(());
            }
        };

        let available = capacity.working_estimate();
        if available == 0 {
            warn!("volume reports zero available capacity, skipping reclamation");
            return Ok(());
        }

        if required_bytes < available {
            debug!(required_bytes, available, "enough capacity available, nothing to reclaim");
            return Ok(());
        }

        self.reclaim_if_possible(required_bytes - available)
    }

    /// Evict least-recently-used entries until strictly more than
    /// `reclaim_bytes` has been freed.
    ///
    /// The loop continues while the running total has not yet exceeded the
    /// target, so it guarantees at least `reclaim_bytes` is freed and may
    /// overshoot by one entry. If the whole cache is smaller than the
    /// target, reclamation is impossible and nothing is deleted.
    fn reclaim_if_possible(&self, reclaim_bytes: u64) -> Result<()> {
        let mut entries = self.candidates_by_access()?;
        // Least recently used first.
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut cache_used_bytes = 0u64;
        for (_, entry) in &entries {
            cache_used_bytes = cache_used_bytes.saturating_add(entry.size_bytes()?);
        }
        if cache_used_bytes < reclaim_bytes {
            warn!(
                cache_used_bytes,
                reclaim_bytes, "not enough prunable data to reclaim the requested space"
            );
            return Ok(());
        }

        let mut reclaimed = 0u64;
        let mut entries = entries.into_iter();

        while reclaimed <= reclaim_bytes {
            let Some((_, entry)) = entries.next() else {
                break;
            };

            let size = entry.size_bytes()?;
            debug!(path = %entry.path().display(), size, "reclaiming cache entry");

            reclaimed = reclaimed.saturating_add(size);
            entry.delete()?;
        }

        info!(reclaimed, reclaim_bytes, "disk space reclaimed");
        Ok(())
    }
}
