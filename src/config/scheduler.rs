//! Refresh scheduler configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between scheduled refreshes
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Start polling when the session starts
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval_secs == 0 {
            return Err(ValidationError::InvalidRefreshInterval);
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            enabled: default_enabled(),
        }
    }
}

fn default_interval() -> u64 {
    30
}

fn default_enabled() -> bool {
    true
}
