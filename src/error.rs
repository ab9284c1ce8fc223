//! Error types for shiurfeed.

use thiserror::Error;

/// Common error type for shiurfeed.
#[derive(Error, Debug)]
pub enum FeedError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level HTTP failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Upstream answered with a non-success status.
    #[error("upstream returned status {status}")]
    Upstream {
        /// HTTP status code.
        status: u16,
    },

    /// JSON decode error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation error for caller input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Deployment collaborator failed.
    #[error("deployment failed: {0}")]
    Deploy(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        FeedError::Http(e.to_string())
    }
}

/// Result type alias for shiurfeed operations.
pub type Result<T> = std::result::Result<T, FeedError>;
