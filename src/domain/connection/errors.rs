//! Errors raised by the push transport.

use thiserror::Error;

/// Transport-level failure.
///
/// `Io` and `Closed` are recoverable through backoff; `Fatal` means the
/// endpoint can never be opened as configured and moves the connection
/// straight to `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("transport unusable: {0}")]
    Fatal(String),

    #[error("transport I/O failure: {0}")]
    Io(String),

    #[error("transport closed")]
    Closed,
}

impl TransportError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, TransportError::Fatal(_))
    }
}
