//! Reconnect backoff policy.

use std::time::Duration;

/// Default cap on consecutive failed cycles before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Exponential backoff with a ceiling.
///
/// The delay before reconnect attempt `k` (1-based) is
/// `min(max_delay, base_delay * multiplier^(k-1))`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Consecutive failed cycles tolerated before entering `Error`.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(5_000),
            max_delay: Duration::from_millis(30_000),
            multiplier: 1.5,
        }
    }
}

impl ReconnectPolicy {
    /// Delay to wait before the given 1-based attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let base_ms = self.base_delay.as_millis() as f64;
        let max_ms = self.max_delay.as_millis() as f64;
        let delay_ms = (base_ms * self.multiplier.powi(exponent)).min(max_ms);
        Duration::from_millis(delay_ms.round() as u64)
    }

    /// True once `attempts` failed cycles exhaust the budget.
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        attempts >= self.max_attempts
    }
}
