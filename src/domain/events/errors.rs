//! Errors for inbound frame decoding.

use thiserror::Error;

/// A frame that could not be turned into an [`Envelope`](super::Envelope).
///
/// Logged and dropped by the connection driver; never affects connection
/// state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedEventError {
    #[error("frame is not a valid envelope: {0}")]
    InvalidJson(String),

    #[error("envelope data must be an object, got {0}")]
    NonObjectData(&'static str),
}
