//! Push stream configuration

use serde::Deserialize;
use std::time::Duration;

use crate::domain::connection::{ReconnectPolicy, DEFAULT_MAX_ATTEMPTS};

use super::environment::Environment;
use super::error::ValidationError;

/// Push stream (websocket) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Websocket endpoint, `ws://` or `wss://`
    pub url: String,

    /// Consecutive failed cycles before giving up
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Delay before the first reconnect attempt
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Ceiling for the reconnect delay
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl StreamConfig {
    /// Backoff policy for the connection manager
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            max_attempts: self.max_reconnect_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            multiplier: self.backoff_multiplier,
        }
    }

    /// Validate stream configuration
    ///
    /// In production the stream must be TLS.
    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("STREAM__URL"));
        }
        if !self.url.starts_with("ws://") && !self.url.starts_with("wss://") {
            return Err(ValidationError::InvalidStreamUrl);
        }
        if environment.is_production() && !self.url.starts_with("wss://") {
            return Err(ValidationError::StreamMustBeSecure);
        }
        if self.max_reconnect_attempts == 0 {
            return Err(ValidationError::InvalidBackoff("max_reconnect_attempts is 0"));
        }
        if self.base_delay_ms == 0 {
            return Err(ValidationError::InvalidBackoff("base_delay_ms is 0"));
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err(ValidationError::InvalidBackoff(
                "max_delay_ms is below base_delay_ms",
            ));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(ValidationError::InvalidBackoff(
                "backoff_multiplier must be >= 1.0",
            ));
        }
        Ok(())
    }
}

fn default_max_reconnect_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_base_delay_ms() -> u64 {
    5_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_backoff_multiplier() -> f64 {
    1.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(url: &str) -> StreamConfig {
        serde_json::from_value(serde_json::json!({ "url": url })).unwrap()
    }

    #[test]
    fn defaults_match_reconnect_policy_defaults() {
        assert_eq!(stream("ws://localhost:5000/ws").reconnect_policy(), ReconnectPolicy::default());
    }

    #[test]
    fn rejects_http_url() {
        assert_eq!(
            stream("http://localhost/ws").validate(Environment::Development),
            Err(ValidationError::InvalidStreamUrl)
        );
    }

    #[test]
    fn production_requires_wss() {
        let config = stream("ws://dashboard.example.org/ws");
        assert!(config.validate(Environment::Development).is_ok());
        assert_eq!(
            config.validate(Environment::Production),
            Err(ValidationError::StreamMustBeSecure)
        );
    }

    #[test]
    fn shrinking_multiplier_is_rejected() {
        let mut config = stream("ws://localhost/ws");
        config.backoff_multiplier = 0.5;
        assert!(matches!(
            config.validate(Environment::Development),
            Err(ValidationError::InvalidBackoff(_))
        ));
    }
}
