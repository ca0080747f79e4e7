//! Point-in-time statistics for the cache policies.
//!
//! Each core keeps a [`Counters`] block updated on its `&mut` paths and
//! builds a `Copy` snapshot on demand. Snapshots render as a one-line human
//! readable summary; the exact text carries no compatibility promise.

use std::fmt;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Counters {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub updates: u64,
    pub evictions: u64,
}

impl Counters {
    #[inline]
    pub fn record_lookup(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }

    #[inline]
    pub fn record_insert(&mut self) {
        self.inserts += 1;
    }

    #[inline]
    pub fn record_update(&mut self) {
        self.updates += 1;
    }

    #[inline]
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}

/// Snapshot of a [`PinnedLruCore`](crate::policy::pinned_lru::PinnedLruCore).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PinnedLruStats {
    // gauges
    pub len: usize,
    pub queued: usize,
    pub pinned: usize,
    pub size: usize,

    // counters since construction
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub updates: u64,
    pub evictions: u64,
}

impl PinnedLruStats {
    pub(crate) fn new(len: usize, queued: usize, size: usize, counters: Counters) -> Self {
        Self {
            len,
            queued,
            pinned: len - queued,
            size,
            hits: counters.hits,
            misses: counters.misses,
            inserts: counters.inserts,
            updates: counters.updates,
            evictions: counters.evictions,
        }
    }

    /// Fraction of `get` calls that hit; `0.0` before the first lookup.
    pub fn hit_ratio(&self) -> f64 {
        hit_ratio(self.hits, self.misses)
    }
}

impl fmt::Display for PinnedLruStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records, {} in queue, {} pinned (hits={} misses={} evictions={})",
            self.len, self.queued, self.pinned, self.hits, self.misses, self.evictions
        )
    }
}

/// Snapshot of a [`WeightedLruCore`](crate::policy::weighted_lru::WeightedLruCore).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WeightedLruStats {
    // gauges
    pub len: usize,
    pub capacity: u64,
    pub used_capacity: u64,

    // counters since construction
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub updates: u64,
    pub evictions: u64,
}

impl WeightedLruStats {
    pub(crate) fn new(len: usize, capacity: u64, used_capacity: u64, counters: Counters) -> Self {
        Self {
            len,
            capacity,
            used_capacity,
            hits: counters.hits,
            misses: counters.misses,
            inserts: counters.inserts,
            updates: counters.updates,
            evictions: counters.evictions,
        }
    }

    pub fn hit_ratio(&self) -> f64 {
        hit_ratio(self.hits, self.misses)
    }
}

impl fmt::Display for WeightedLruStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LRU used capacity: {} of {} across {} records (hits={} misses={} evictions={})",
            self.used_capacity,
            self.capacity,
            self.len,
            self.hits,
            self.misses,
            self.evictions
        )
    }
}

fn hit_ratio(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}
