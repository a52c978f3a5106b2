//! Configuration Module
//!
//! Loads cache tuning from environment variables.

use std::env;
use std::str::FromStr;

use tracing::warn;

use crate::cache::DEFAULT_TTL_SECS;
use crate::error::{CacheError, Result};

pub const ENV_DEFAULT_TTL: &str = "DATA_CACHE_DEFAULT_TTL";
pub const ENV_MAX_ENTRIES: &str = "DATA_CACHE_MAX_ENTRIES";
pub const ENV_SWEEP_INTERVAL: &str = "DATA_CACHE_SWEEP_INTERVAL";

const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL in seconds for writes that name none; always positive
    pub default_ttl: u64,
    /// Entry bound, None = unbounded
    pub max_entries: Option<usize>,
    /// Seconds between background purges, 0 = no background purge
    pub sweep_interval: u64,
}

impl CacheConfig {
    /// Loads configuration from the environment, falling back to the default
    /// for any variable that is unset or invalid.
    ///
    /// # Environment Variables
    /// - `DATA_CACHE_DEFAULT_TTL` - Default TTL in seconds, > 0 (default: 30)
    /// - `DATA_CACHE_MAX_ENTRIES` - Entry bound, 0 = unbounded (default: unbounded)
    /// - `DATA_CACHE_SWEEP_INTERVAL` - Purge interval in seconds, 0 = off (default: 60)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Lenient loading through an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            default_ttl: parse_ttl(lookup(ENV_DEFAULT_TTL))
                .unwrap_or_else(|err| fallback(err, defaults.default_ttl)),
            max_entries: parse_max_entries(lookup(ENV_MAX_ENTRIES))
                .unwrap_or_else(|err| fallback(err, defaults.max_entries)),
            sweep_interval: parse_var::<u64>(ENV_SWEEP_INTERVAL, lookup(ENV_SWEEP_INTERVAL))
                .map(|v| v.unwrap_or(defaults.sweep_interval))
                .unwrap_or_else(|err| fallback(err, defaults.sweep_interval)),
        }
    }

    /// Loads configuration from the environment, rejecting invalid values.
    pub fn try_from_env() -> Result<Self> {
        Self::try_from_lookup(|name| env::var(name).ok())
    }

    /// Strict loading through an arbitrary variable source.
    pub fn try_from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            default_ttl: parse_ttl(lookup(ENV_DEFAULT_TTL))?,
            max_entries: parse_max_entries(lookup(ENV_MAX_ENTRIES))?,
            sweep_interval: parse_var::<u64>(ENV_SWEEP_INTERVAL, lookup(ENV_SWEEP_INTERVAL))?
                .unwrap_or(defaults.sweep_interval),
        })
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL_SECS,
            max_entries: None,
            sweep_interval: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, raw: Option<String>) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|err: T::Err| CacheError::InvalidConfig {
                name: name.to_string(),
                value: raw.clone(),
                reason: err.to_string(),
            }),
    }
}

fn parse_ttl(raw: Option<String>) -> Result<u64> {
    match parse_var::<u64>(ENV_DEFAULT_TTL, raw)? {
        None => Ok(DEFAULT_TTL_SECS),
        Some(0) => Err(CacheError::InvalidConfig {
            name: ENV_DEFAULT_TTL.to_string(),
            value: "0".to_string(),
            reason: "default TTL must be positive".to_string(),
        }),
        Some(ttl) => Ok(ttl),
    }
}

fn parse_max_entries(raw: Option<String>) -> Result<Option<usize>> {
    Ok(parse_var::<usize>(ENV_MAX_ENTRIES, raw)?.filter(|&n| n > 0))
}

fn fallback<T: std::fmt::Debug>(err: CacheError, default: T) -> T {
    warn!("{}; using default {:?}", err, default);
    default
}
