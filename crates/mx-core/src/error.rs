//! Error types for evmix

use thiserror::Error;

/// evmix error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Event table error
    #[error("Table error: {0}")]
    Table(String),

    /// Mixing error
    #[error("Mixing error: {0}")]
    Mixing(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
