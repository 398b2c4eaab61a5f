//! Common error types for compreg

use thiserror::Error;

/// Common result type for compreg operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the pipeline crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tenant or record missing from the shared store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row or record with an out-of-range or malformed field
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
