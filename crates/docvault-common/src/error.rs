//! Error types shared across docvault crates

use thiserror::Error;

/// Result type alias for docvault operations
pub type Result<T> = std::result::Result<T, DocvaultError>;

/// Main error type for docvault
#[derive(Error, Debug)]
pub enum DocvaultError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
