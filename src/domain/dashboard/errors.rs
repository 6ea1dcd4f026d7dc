//! REST fetch failures.

use thiserror::Error;

/// Failure to refresh one cached resource.
///
/// Recorded on that resource only; other resources and the previous data
/// are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("server returned HTTP {status}")]
    Http { status: u16 },

    #[error("{0}")]
    Rejected(String),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        FetchError::Network(message.into())
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        FetchError::Rejected(message.into())
    }
}
