//! Error types for the roster cache

use thiserror::Error;

/// Result type alias for roster cache storage operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors raised by roster cache storage backends
#[derive(Error, Debug)]
pub enum CacheError {
    /// I/O errors reading or writing the cache file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Cache key that does not follow the "SPORT:YYYY-MM-DD" layout
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),
}
