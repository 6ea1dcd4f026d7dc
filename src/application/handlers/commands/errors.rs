//! Errors returned by the write-operation handlers.

use thiserror::Error;

use crate::domain::dashboard::FetchError;
use crate::domain::foundation::ValidationError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    /// Rejected locally before any request was made.
    #[error("invalid command: {0}")]
    Validation(#[from] ValidationError),

    /// The backend could not be reached or refused the operation.
    #[error(transparent)]
    Backend(#[from] FetchError),
}

impl CommandError {
    /// True when retrying the same command may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CommandError::Backend(FetchError::Network(_) | FetchError::Timeout { .. })
        )
    }
}
