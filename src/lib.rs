//! Posyandu Data Cache - session-lifetime cache for dashboard screens
//!
//! Keeps fetched lists and detail views in memory with a per-entry TTL so
//! navigating back to a screen does not always hit the REST backend, while
//! never serving data past its freshness window.

pub mod cache;
pub mod config;
pub mod error;
pub mod guard;
pub mod keys;
pub mod provider;
pub mod tasks;
pub mod telemetry;

pub use cache::{Clock, DataCache, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use guard::{RequestSequence, RequestTicket};
pub use keys::{CacheKey, Role};
pub use provider::CacheProvider;
pub use tasks::spawn_sweep_task;
