//! Expiry Sweep Task
//!
//! Reads already ignore stale entries; this task only reclaims the memory of
//! entries that expire and are never read again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::provider::CacheProvider;

/// Spawns a task that purges expired entries every `interval_secs` seconds.
///
/// Returns None when `interval_secs` is 0 (sweeping disabled). Abort the
/// returned handle when the session ends.
///
/// # Example
/// ```ignore
/// let provider = CacheProvider::from_config(&config);
/// let sweep = spawn_sweep_task(provider.clone(), config.sweep_interval);
/// // Later, on shutdown:
/// if let Some(handle) = sweep {
///     handle.abort();
/// }
/// ```
pub fn spawn_sweep_task(provider: CacheProvider, interval_secs: u64) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        debug!("Cache sweep disabled");
        return None;
    }

    let interval = Duration::from_secs(interval_secs);

    Some(tokio::spawn(async move {
        info!(
            "Starting cache sweep task with interval of {} seconds",
            interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = provider.purge_expired().await;

            if removed > 0 {
                info!("Cache sweep: removed {} expired entries", removed);
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    }))
}
