//! Client error types.

use thiserror::Error;

use super::gate::RefreshError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned a non-success status; carries the server-provided
    /// error message or a generic fallback.
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// The shared token refresh settled with a failure.
    #[error(transparent)]
    Refresh(#[from] RefreshError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}
