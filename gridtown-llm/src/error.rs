//! Completion error types.

use thiserror::Error;

/// Errors from one remote completion call.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The HTTP request itself failed.
    #[error("completion request failed: {0}")]
    RequestFailed(String),

    /// The request timed out.
    #[error("completion request timed out after {0}ms")]
    Timeout(u64),

    /// No endpoint is configured, or it refused the connection.
    #[error("completion endpoint unavailable: {0}")]
    Unavailable(String),

    /// The endpoint answered with a non-success status.
    #[error("completion endpoint returned HTTP {0}")]
    Status(u16),

    /// The response body did not match the expected schema.
    #[error("malformed completion body: {0}")]
    MalformedBody(String),
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CompletionError::Timeout(0)
        } else if err.is_connect() {
            CompletionError::Unavailable(err.to_string())
        } else {
            CompletionError::RequestFailed(err.to_string())
        }
    }
}
