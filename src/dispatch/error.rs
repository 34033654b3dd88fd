//! Dispatcher error taxonomy.

use thiserror::Error;

/// Errors surfaced by the outbound dispatcher and its direct callers.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The effective proxy endpoint is not a usable URL.
    #[error("Invalid proxy URL '{endpoint}': {reason}")]
    InvalidProxyUrl { endpoint: String, reason: String },

    /// Connection, DNS, TLS, proxy tunnel or body read failure.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// No response within the transport deadline.
    #[error("Request timed out")]
    Timeout,

    /// The exchange completed but the counterparty's answer is unusable.
    #[error("Upstream error (status {status}): {message}")]
    Upstream { status: u16, message: String },
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DispatchError::Timeout
        } else {
            DispatchError::Network(err)
        }
    }
}

/// Result type for dispatcher operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
