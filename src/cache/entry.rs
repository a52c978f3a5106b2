//! Cache Entry Module
//!
//! A stored value together with its absolute expiry.

use chrono::{DateTime, TimeZone, Utc};

// == Cache Entry ==
/// A single cached payload with write and expiry timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Write timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry written at `now_ms` that stays fresh for `ttl_secs`.
    pub fn new(value: V, now_ms: u64, ttl_secs: u64) -> Self {
        Self {
            value,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_secs.saturating_mul(1000)),
        }
    }

    // == Is Expired ==
    /// An entry is stale once `now_ms` reaches `expires_at`; the boundary
    /// instant itself already counts as expired.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }

    // == Time To Live ==
    /// Remaining freshness in milliseconds, zero once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at.saturating_sub(now_ms)
    }

    pub fn created_at_utc(&self) -> DateTime<Utc> {
        to_utc(self.created_at)
    }

    pub fn expires_at_utc(&self) -> DateTime<Utc> {
        to_utc(self.expires_at)
    }
}

fn to_utc(ms: u64) -> DateTime<Utc> {
    i64::try_from(ms)
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
