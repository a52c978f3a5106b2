//! Clock Module
//!
//! Time source for expiry decisions. The store never reads wall-clock time
//! directly, so tests can drive expiry with a [`ManualClock`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

// == Clock Trait ==
/// Supplies the current time in Unix milliseconds.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now_ms(&self) -> u64;
}

// == System Clock ==
/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        // Pre-epoch readings clamp to zero.
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

// == Manual Clock ==
/// A clock that only moves when told to.
///
/// Clones share the same reading, so a test can keep one handle and pass
/// another into the cache.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock reading `start_ms`.
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let ms = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }

    /// Jumps to an absolute reading.
    pub fn set_ms(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_ms() > 1_577_836_800_000);
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(1_000);
        clock.advance_secs(2);
        assert_eq!(clock.now_ms(), 3_000);

        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.now_ms(), 3_250);
    }

    #[test]
    fn test_manual_clock_clones_share_reading() {
        let clock = ManualClock::new(0);
        let shared: Arc<dyn Clock> = Arc::new(clock.clone());

        clock.set_ms(42);
        assert_eq!(shared.now_ms(), 42);
    }
}
