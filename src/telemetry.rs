//! Tracing setup for applications embedding the cache.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "posyandu_cache=info";

/// Installs a global fmt subscriber filtered by `RUST_LOG`, defaulting to
/// [`DEFAULT_FILTER`].
///
/// Returns false if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
