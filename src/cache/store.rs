//! Cache Store Module
//!
//! The session data cache: a key-value map with per-entry TTL, expired lazily
//! on read, optionally bounded by entry count with LRU eviction.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Clock, RecencyIndex, SystemClock};
use crate::config::CacheConfig;

// == Entry Info ==
/// Inspection view of one fresh entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryInfo {
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub ttl_remaining_ms: u64,
}

// == Data Cache ==
/// In-memory cache from string keys to values of type `V`.
///
/// Every operation is synchronous. An entry whose expiry has been reached is
/// never returned; it is dropped the next time it is read, or by
/// [`DataCache::purge_expired`].
#[derive(Debug)]
pub struct DataCache<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Use order, maintained only when bounded
    recency: RecencyIndex,
    stats: CacheStats,
    clock: Arc<dyn Clock>,
    /// TTL in seconds applied when a write names none
    default_ttl: u64,
    /// None = unbounded
    max_entries: Option<usize>,
}

impl<V> DataCache<V> {
    // == Constructors ==
    /// Creates an unbounded cache on wall-clock time.
    pub fn new(default_ttl: u64) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    /// Creates an unbounded cache reading time from `clock`.
    pub fn with_clock(default_ttl: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            recency: RecencyIndex::new(),
            stats: CacheStats::new(),
            clock,
            default_ttl,
            max_entries: None,
        }
    }

    /// Creates a cache shaped by `config`.
    pub fn from_config(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_clock(config.default_ttl, clock).with_max_entries(config.max_entries)
    }

    /// Bounds the number of stored entries. `None` or `Some(0)` means unbounded.
    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries.filter(|&n| n > 0);
        self.recency.clear();
        if self.max_entries.is_some() {
            for key in self.entries.keys() {
                self.recency.touch(key);
            }
        }
        self
    }

    // == Get ==
    /// Returns the value for `key` if a fresh entry exists.
    ///
    /// A stale entry is removed and the read counts as a miss.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let now = self.clock.now_ms();

        match self.entries.get(key).map(|entry| entry.is_expired(now)) {
            None => {
                self.stats.record_miss();
                debug!(key = %key, "cache miss");
                None
            }
            Some(true) => {
                self.remove_entry(key);
                self.stats.record_expired(1);
                self.stats.record_miss();
                debug!(key = %key, "cache entry expired");
                None
            }
            Some(false) => {
                self.stats.record_hit();
                self.touch(key);
                debug!(key = %key, "cache hit");
                self.entries.get(key).map(|entry| &entry.value)
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl` seconds, or the default TTL when
    /// `ttl` is None.
    ///
    /// Any previous entry for the key is replaced outright, expiry included.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<u64>) {
        let key = key.into();
        let ttl = ttl.unwrap_or(self.default_ttl);
        let now = self.clock.now_ms();

        if !self.entries.contains_key(&key) {
            self.make_room(now);
        }

        debug!(key = %key, ttl_secs = ttl, "cache set");
        self.entries.insert(key.clone(), CacheEntry::new(value, now, ttl));
        self.touch(&key);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Invalidate ==
    /// Removes the entry for `key`. Returns whether one was present.
    pub fn invalidate(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key);
        if removed {
            self.stats.record_invalidations(1);
            debug!(key = %key, "cache invalidated");
        }
        removed
    }

    // == Invalidate Prefix ==
    /// Removes every fresh entry whose key starts with `prefix` and returns
    /// how many were removed. Stale matches are dropped too but count as
    /// expired, not invalidated.
    pub fn invalidate_prefix(&mut self, prefix: &str) -> usize {
        self.purge_expired();

        let keys: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();

        for key in &keys {
            self.remove_entry(key);
        }

        self.stats.record_invalidations(keys.len());
        debug!(prefix = %prefix, removed = keys.len(), "cache prefix invalidated");
        keys.len()
    }

    // == Clear ==
    /// Drops every entry. Stale ones count as expired.
    pub fn clear(&mut self) {
        self.purge_expired();
        self.stats.record_invalidations(self.entries.len());
        self.entries.clear();
        self.recency.clear();
        self.stats.set_total_entries(0);
    }

    // == Contains ==
    /// True when a fresh entry exists. Does not touch stats or evict.
    pub fn contains(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    // == TTL Remaining ==
    /// Remaining freshness of a fresh entry, in milliseconds.
    pub fn ttl_remaining_ms(&self, key: &str) -> Option<u64> {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.ttl_remaining_ms(now))
    }

    // == Fresh Length ==
    /// Number of fresh entries. Does not evict.
    pub fn len_fresh(&self) -> usize {
        let now = self.clock.now_ms();
        self.entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    // == Snapshot ==
    /// Lists fresh entries sorted by key.
    pub fn snapshot(&self) -> Vec<EntryInfo> {
        let now = self.clock.now_ms();
        let mut infos: Vec<EntryInfo> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, entry)| EntryInfo {
                key: key.clone(),
                created_at: entry.created_at_utc(),
                expires_at: entry.expires_at_utc(),
                ttl_remaining_ms: entry.ttl_remaining_ms(now),
            })
            .collect();
        infos.sort_by(|a, b| a.key.cmp(&b.key));
        infos
    }

    // == Purge Expired ==
    /// Removes all stale entries and returns how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        self.purge_expired_at(now)
    }

    // == Stats ==
    /// Returns a snapshot of the counters with the current entry count.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Number of stored entries, stale ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored, stale entries included.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// TTL in seconds applied to writes that name none.
    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    /// Entry bound, None when unbounded.
    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    // == Internals ==
    fn touch(&mut self, key: &str) {
        if self.max_entries.is_some() {
            self.recency.touch(key);
        }
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.recency.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    fn purge_expired_at(&mut self, now: u64) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }

        self.stats.record_expired(expired.len());
        expired.len()
    }

    /// Frees a slot for a new key when bounded and full: stale entries go
    /// first, then the least recently used.
    fn make_room(&mut self, now: u64) {
        let Some(max) = self.max_entries else {
            return;
        };

        if self.entries.len() >= max {
            self.purge_expired_at(now);
        }

        while self.entries.len() >= max {
            let Some(oldest) = self.recency.pop_least_recent() else {
                break;
            };
            if self.entries.remove(&oldest).is_some() {
                self.stats.record_eviction();
                debug!(key = %oldest, "cache evicted least recently used entry");
            }
        }
    }
}
