//! Error types for the celebrate ecosystem.

use thiserror::Error;

/// Errors that can occur in celebrate operations.
#[derive(Error, Debug)]
pub enum CelebrateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid reminder time '{0}'. Expected HH:MM")]
    InvalidTime(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Notifier error: {0}")]
    Notifier(String),

    #[error("Custom type not found: {0}")]
    CustomTypeNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CelebrateError {
    fn from(e: serde_json::Error) -> Self {
        CelebrateError::Serialization(e.to_string())
    }
}

/// Result type alias for celebrate operations.
pub type CelebrateResult<T> = Result<T, CelebrateError>;
