//! Cache Statistics Module
//!
//! Counters describing how well the cache is saving fetches.

use serde::Serialize;

// == Cache Stats ==
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads answered from a fresh entry
    pub hits: u64,
    /// Reads that found nothing fresh (missing or expired)
    pub misses: u64,
    /// Stale entries dropped, lazily on read or by a purge
    pub expired: u64,
    /// Entries removed by explicit invalidation
    pub invalidations: u64,
    /// Entries dropped to respect the capacity bound
    pub evictions: u64,
    /// Entries currently stored, stale ones included until purged
    pub total_entries: usize,
}

impl CacheStats {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 before any read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Recording ==
    /// Counts a read answered from a fresh entry.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Counts a read that found nothing fresh.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Counts `count` stale entries dropped.
    pub fn record_expired(&mut self, count: usize) {
        self.expired += count as u64;
    }

    /// Counts `count` entries removed on request.
    pub fn record_invalidations(&mut self, count: usize) {
        self.invalidations += count as u64;
    }

    /// Counts one entry dropped for capacity.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Sets the current entry count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
