//! REST API configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::environment::Environment;
use super::error::ValidationError;

/// Dashboard REST API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// API root, e.g. `https://safety.example.org/api`
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Bearer token sent with every request
    #[serde(default)]
    pub auth_token: Option<Secret<String>>,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate API configuration
    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("API__BASE_URL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidApiUrl);
        }
        if environment.is_production() && !self.base_url.starts_with("https://") {
            return Err(ValidationError::ApiMustBeHttps);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn token_is_optional_and_hidden() {
        let config: ApiConfig = serde_json::from_value(serde_json::json!({
            "base_url": "https://safety.example.org/api",
            "auth_token": "tok-123"
        }))
        .unwrap();

        assert_eq!(config.auth_token.as_ref().map(|t| t.expose_secret().as_str()), Some("tok-123"));
        assert!(!format!("{config:?}").contains("tok-123"));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let config = ApiConfig {
            base_url: "http://localhost:5000/api".into(),
            request_timeout_secs: 0,
            auth_token: None,
        };
        assert_eq!(
            config.validate(Environment::Development),
            Err(ValidationError::InvalidTimeout)
        );
    }

    #[test]
    fn production_requires_https() {
        let config = ApiConfig {
            base_url: "http://safety.example.org/api".into(),
            request_timeout_secs: 30,
            auth_token: None,
        };
        assert_eq!(
            config.validate(Environment::Production),
            Err(ValidationError::ApiMustBeHttps)
        );
    }
}
