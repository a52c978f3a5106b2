//! Error types for the data cache
//!
//! Reads and writes on the store never fail; errors only come from converting
//! typed values to JSON and from loading configuration.

use thiserror::Error;

// == Cache Error Enum ==
#[derive(Error, Debug)]
pub enum CacheError {
    /// A typed value could not be converted to a JSON payload
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An environment variable holds an unusable value
    #[error("Invalid config {name}={value:?}: {reason}")]
    InvalidConfig {
        name: String,
        value: String,
        reason: String,
    },
}

// == Result Type Alias ==
pub type Result<T> = std::result::Result<T, CacheError>;
