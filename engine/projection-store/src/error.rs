//! Error types for the projection store

use projection_model::ProjectionId;
use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in a projection store backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Projection not found: {id}")]
    NotFound { id: ProjectionId },

    /// The record already carries a result; results are written once
    #[error("Projection already resolved: {id}")]
    AlreadyResolved { id: ProjectionId },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row that cannot be turned back into a projection
    #[error("Corrupt record: {message}")]
    Corrupt { message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl StoreError {
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt { message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig { message: message.into() }
    }
}
