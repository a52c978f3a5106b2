//! Cache Provider
//!
//! The session-wide handle feature screens share. It is built once at the
//! root of the app and cloned into every screen; all clones see the same
//! store. Payloads are held as JSON and decoded through typed [`CacheKey`]s.

use std::future::Future;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, Clock, DataCache, EntryInfo, SystemClock};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::guard::{RequestSequence, RequestTicket};
use crate::keys::CacheKey;

// == Cache Provider ==
/// Shared, cloneable access to one session cache.
///
/// Every operation takes the write lock: reads update stats and may drop a
/// stale entry. The lock is never held while a loader runs.
#[derive(Clone, Debug)]
pub struct CacheProvider {
    cache: Arc<RwLock<DataCache<Value>>>,
}

impl CacheProvider {
    // == Constructors ==
    /// Shares an already built store.
    pub fn new(cache: DataCache<Value>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    /// Creates the session cache from configuration, on wall-clock time.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    /// Creates the session cache from configuration, reading time from `clock`.
    pub fn from_config_with_clock(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        info!(
            default_ttl = config.default_ttl,
            max_entries = ?config.max_entries,
            "Data cache initialized"
        );
        Self::new(DataCache::from_config(config, clock))
    }

    // == Typed Access ==
    /// Returns the cached value for `key` when fresh.
    ///
    /// A payload that does not decode as `T` is dropped and reported as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey<T>) -> Option<T> {
        let mut cache = self.cache.write().await;
        let raw = cache.get(key.as_str())?;

        match T::deserialize(raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key = %key, error = %err, "Cached payload has unexpected shape, dropping");
                cache.invalidate(key.as_str());
                None
            }
        }
    }

    /// Caches `value` under `key` for `ttl` seconds (default TTL when None).
    pub async fn set<T: Serialize>(
        &self,
        key: &CacheKey<T>,
        value: &T,
        ttl: Option<u64>,
    ) -> Result<()> {
        let json = serde_json::to_value(value)?;
        self.cache.write().await.set(key.as_str(), json, ttl);
        Ok(())
    }

    /// Drops the entry for `key`. Returns whether one was present.
    pub async fn invalidate<T>(&self, key: &CacheKey<T>) -> bool {
        self.invalidate_raw(key.as_str()).await
    }

    /// True when a fresh entry exists. Does not count as a read.
    pub async fn contains<T>(&self, key: &CacheKey<T>) -> bool {
        self.cache.read().await.contains(key.as_str())
    }

    // == Untyped Access ==
    /// Returns the fresh JSON payload stored under `key`.
    pub async fn get_raw(&self, key: &str) -> Option<Value> {
        self.cache.write().await.get(key).cloned()
    }

    /// Stores a JSON payload under `key` for `ttl` seconds (default TTL when None).
    pub async fn set_raw(&self, key: impl Into<String>, value: Value, ttl: Option<u64>) {
        self.cache.write().await.set(key, value, ttl);
    }

    /// Drops the entry for `key`. Returns whether one was present.
    pub async fn invalidate_raw(&self, key: &str) -> bool {
        self.cache.write().await.invalidate(key)
    }

    /// Drops every key starting with `prefix`, e.g. all pages of a list
    /// after one of its records changed.
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        self.cache.write().await.invalidate_prefix(prefix)
    }

    /// Drops every entry, e.g. on logout.
    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    // == Fetch Helpers ==
    /// Returns the cached value, or runs `loader` and caches what it returns.
    ///
    /// A failed load is returned as is and nothing is written, so an error is
    /// never served as data.
    pub async fn fetch_through<T, E, F, Fut>(
        &self,
        key: &CacheKey<T>,
        ttl: Option<u64>,
        loader: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        if let Some(cached) = self.get(key).await {
            return Ok(cached);
        }

        let value = loader().await?;
        self.store_loaded(key, &value, ttl).await;
        Ok(value)
    }

    /// Always runs `loader`. On success the entry is replaced; on failure the
    /// previous entry stays as it was.
    pub async fn refresh<T, E, F, Fut>(
        &self,
        key: &CacheKey<T>,
        ttl: Option<u64>,
        loader: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let value = loader().await?;
        self.store_loaded(key, &value, ttl).await;
        Ok(value)
    }

    /// Caches `value` only if `ticket` is still the latest issued by
    /// `sequence`. Returns whether the write happened.
    pub async fn commit_if_current<T: Serialize>(
        &self,
        sequence: &RequestSequence,
        ticket: RequestTicket,
        key: &CacheKey<T>,
        value: &T,
        ttl: Option<u64>,
    ) -> Result<bool> {
        let json = serde_json::to_value(value)?;
        let mut cache = self.cache.write().await;

        if !sequence.is_current(ticket) {
            debug!(key = %key, ticket = ticket.id(), "Discarding superseded response");
            return Ok(false);
        }

        cache.set(key.as_str(), json, ttl);
        Ok(true)
    }

    // == Maintenance ==
    /// Removes all stale entries and returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        self.cache.write().await.purge_expired()
    }

    /// Returns a snapshot of the cache counters.
    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    /// Lists fresh entries sorted by key.
    pub async fn snapshot(&self) -> Vec<EntryInfo> {
        self.cache.read().await.snapshot()
    }

    /// Number of stored entries, stale ones included until purged.
    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Number of fresh entries. Does not evict.
    pub async fn len_fresh(&self) -> usize {
        self.cache.read().await.len_fresh()
    }

    /// Returns true if nothing is stored, stale entries included.
    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    async fn store_loaded<T: Serialize>(&self, key: &CacheKey<T>, value: &T, ttl: Option<u64>) {
        if let Err(err) = self.set(key, value, ttl).await {
            warn!(key = %key, error = %err, "Loaded value not cached");
        }
    }
}
