//! Error types for the box-score fetchers

use thiserror::Error;

/// Result type alias for fetcher operations
pub type Result<T> = std::result::Result<T, FetchError>;

/// Errors raised while talking to an upstream provider.
///
/// None of these are fatal to an evaluation batch: callers skip the affected
/// game or projection and carry on.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport errors (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// Payload did not have the expected shape
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// API key not present in the environment
    #[error("Missing credentials: environment variable {0} is not set")]
    MissingCredentials(String),

    /// Provider reported it cannot serve the request
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

impl FetchError {
    /// Create a new malformed payload error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Create a new provider unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Malformed(err.to_string())
    }
}
