//! Error types for the webshell core library.

use thiserror::Error;

/// Result type alias using the core Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for webshell operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Permission name not in the catalogue
    #[error("Unknown permission: {0}")]
    InvalidPermission(String),

    /// Action name not in the catalogue, or payload missing
    #[error("Invalid pending action: {0}")]
    InvalidAction(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
