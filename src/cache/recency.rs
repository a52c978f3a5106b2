//! Recency Module
//!
//! Least-recently-used ordering for bounded caches.

use std::collections::{BTreeMap, HashMap};

// == Recency Index ==
/// Orders keys by last use.
///
/// Every touch stamps the key with a fresh tick; the smallest tick is the
/// least recently used key.
#[derive(Debug, Default)]
pub struct RecencyIndex {
    by_tick: BTreeMap<u64, String>,
    ticks: HashMap<String, u64>,
    next_tick: u64,
}

impl RecencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used, inserting it if unseen.
    pub fn touch(&mut self, key: &str) {
        let tick = self.next_tick;
        self.next_tick += 1;

        match self.ticks.get_mut(key) {
            Some(old) => {
                self.by_tick.remove(old);
                *old = tick;
            }
            None => {
                self.ticks.insert(key.to_string(), tick);
            }
        }
        self.by_tick.insert(tick, key.to_string());
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) {
        if let Some(tick) = self.ticks.remove(key) {
            self.by_tick.remove(&tick);
        }
    }

    // == Pop Least Recent ==
    /// Removes and returns the least recently used key.
    pub fn pop_least_recent(&mut self) -> Option<String> {
        let (_, key) = self.by_tick.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }

    pub fn peek_least_recent(&self) -> Option<&str> {
        self.by_tick.values().next().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.by_tick.clear();
        self.ticks.clear();
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}
