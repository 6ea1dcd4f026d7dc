//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `SAFETY_DASHBOARD` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use safety_dashboard_sync::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Streaming from {}", config.stream.url);
//! ```

mod api;
mod environment;
mod error;
mod features;
mod feeds;
mod scheduler;
mod stream;

pub use api::ApiConfig;
pub use environment::Environment;
pub use error::{ConfigError, ValidationError};
pub use features::FeatureFlags;
pub use feeds::FeedConfig;
pub use scheduler::SchedulerConfig;
pub use stream::StreamConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    /// `tracing_subscriber::EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Push stream endpoint and reconnect backoff
    pub stream: StreamConfig,

    /// Dashboard REST API
    pub api: ApiConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub feeds: FeedConfig,

    #[serde(default)]
    pub features: FeatureFlags,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SAFETY_DASHBOARD` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `SAFETY_DASHBOARD__STREAM__URL=wss://...` -> `stream.url = ...`
    /// - `SAFETY_DASHBOARD__SCHEDULER__INTERVAL_SECS=15` -> `scheduler.interval_secs = 15`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SAFETY_DASHBOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid value found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.stream.validate(self.environment)?;
        self.api.validate(self.environment)?;
        self.scheduler.validate()?;
        self.feeds.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }
}

fn default_log_level() -> String {
    "info,safety_dashboard_sync=debug".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use std::time::Duration;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("SAFETY_DASHBOARD__STREAM__URL", "ws://localhost:5000/ws");
        env::set_var("SAFETY_DASHBOARD__API__BASE_URL", "http://localhost:5000/api");
    }

    fn clear_env() {
        env::remove_var("SAFETY_DASHBOARD__STREAM__URL");
        env::remove_var("SAFETY_DASHBOARD__API__BASE_URL");
        env::remove_var("SAFETY_DASHBOARD__ENVIRONMENT");
        env::remove_var("SAFETY_DASHBOARD__SCHEDULER__INTERVAL_SECS");
        env::remove_var("SAFETY_DASHBOARD__FEATURES__DEBUG_INTROSPECTION");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.stream.url, "ws://localhost:5000/ws");
        assert_eq!(config.api.base_url, "http://localhost:5000/api");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.log_level, "info,safety_dashboard_sync=debug");
        assert_eq!(config.stream.max_reconnect_attempts, 10);
        assert_eq!(config.stream.base_delay_ms, 5_000);
        assert_eq!(config.stream.max_delay_ms, 30_000);
        assert_eq!(config.scheduler.interval(), Duration::from_secs(30));
        assert!(config.scheduler.enabled);
        assert_eq!(config.feeds.alert_capacity, 50);
        assert!(!config.features.debug_introspection);
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("SAFETY_DASHBOARD__SCHEDULER__INTERVAL_SECS", "15");
        env::set_var("SAFETY_DASHBOARD__FEATURES__DEBUG_INTROSPECTION", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.scheduler.interval_secs, 15);
        assert!(config.features.debug_introspection);
    }

    #[test]
    fn test_production_requires_tls() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("SAFETY_DASHBOARD__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert_eq!(config.validate(), Err(ValidationError::StreamMustBeSecure));
    }

    #[test]
    fn test_missing_stream_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("SAFETY_DASHBOARD__API__BASE_URL", "http://localhost:5000/api");
        let result = AppConfig::load();
        clear_env();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
