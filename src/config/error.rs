//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Stream URL must use ws:// or wss://")]
    InvalidStreamUrl,

    #[error("API base URL must use http:// or https://")]
    InvalidApiUrl,

    #[error("Stream URL must use wss:// in production")]
    StreamMustBeSecure,

    #[error("API base URL must use https:// in production")]
    ApiMustBeHttps,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid reconnect backoff: {0}")]
    InvalidBackoff(&'static str),

    #[error("Refresh interval must be at least one second")]
    InvalidRefreshInterval,

    #[error("Feed capacity must be positive: {0}")]
    InvalidFeedCapacity(&'static str),
}
