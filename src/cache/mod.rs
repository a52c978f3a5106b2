//! Cache Module
//!
//! In-memory data cache with per-entry TTL, lazy expiry and an optional
//! LRU capacity bound.

mod clock;
mod entry;
mod recency;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use recency::RecencyIndex;
pub use stats::CacheStats;
pub use store::{DataCache, EntryInfo};

// == Public Constants ==
/// TTL in seconds used when neither the caller nor the config names one
pub const DEFAULT_TTL_SECS: u64 = 30;
