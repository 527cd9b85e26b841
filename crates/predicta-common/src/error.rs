//! Error types shared across Predicta crates

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, PredictaError>;

/// Errors raised by the shared domain types
#[derive(Error, Debug)]
pub enum PredictaError {
    #[error("Invalid file id: {0}")]
    InvalidFileId(String),

    #[error("Invalid file status: {0}")]
    InvalidStatus(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
