//! Error types for studiocal.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur in studiocal operations.
#[derive(Error, Debug)]
pub enum StudioCalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Event store error: {0}")]
    Store(String),

    #[error("Event creation timed out after {}", humantime::format_duration(*.0))]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StudioCalError {
    pub(crate) fn invalid_date(value: &str, reason: impl Into<String>) -> Self {
        StudioCalError::InvalidDate {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for StudioCalError {
    fn from(err: serde_json::Error) -> Self {
        StudioCalError::Serialization(err.to_string())
    }
}

/// Result type alias for studiocal operations.
pub type StudioCalResult<T> = Result<T, StudioCalError>;
