//! Retry policy configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Errors reported by [`RetryPolicy::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    #[error("max-attempts must be at least 1")]
    NoAttempts,

    #[error("multiplier must be a finite value >= 1.0, got {0}")]
    InvalidMultiplier(f64),

    #[error("initial-interval-ms ({initial_ms}) exceeds max-interval-ms ({max_ms})")]
    InitialAboveMax { initial_ms: u64, max_ms: u64 },
}

/// Retry configuration shared by every component that retries or polls.
///
/// Loaded once at process start (the `retry-config` section of the config
/// file) and handed out as `&RetryPolicy`. Nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPolicy {
    /// First wait of the exponential backoff, in milliseconds.
    pub initial_interval_ms: u64,

    /// Upper bound of the exponential backoff used by `with_retry`.
    pub max_interval_ms: u64,

    /// Growth factor applied to the wait after every failed attempt.
    pub multiplier: f64,

    /// Total number of attempts, including the first one.
    pub max_attempts: u32,

    /// First wait of the polling loops. Falls back to `initial_interval_ms`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_time_ms: Option<u64>,

    /// Also cap polling waits at `max_interval_ms`.
    #[serde(default)]
    pub clamp_polling: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval_ms: 1_000,
            max_interval_ms: 10_000,
            multiplier: 2.0,
            max_attempts: 3,
            sleep_time_ms: None,
            clamp_polling: false,
        }
    }
}

impl RetryPolicy {
    /// Create a policy without a separate polling interval and without
    /// polling clamp.
    pub fn new(
        initial_interval_ms: u64,
        max_interval_ms: u64,
        multiplier: f64,
        max_attempts: u32,
    ) -> Self {
        Self {
            initial_interval_ms,
            max_interval_ms,
            multiplier,
            max_attempts,
            sleep_time_ms: None,
            clamp_polling: false,
        }
    }

    /// Seed the polling loops with a different first wait.
    pub fn with_sleep_time_ms(mut self, sleep_time_ms: u64) -> Self {
        self.sleep_time_ms = Some(sleep_time_ms);
        self
    }

    /// Cap polling waits at `max_interval_ms` like the retry combinator does.
    pub fn with_clamped_polling(mut self, clamp: bool) -> Self {
        self.clamp_polling = clamp;
        self
    }

    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    /// First wait of a polling operation.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.sleep_time_ms.unwrap_or(self.initial_interval_ms))
    }

    /// Check the policy can drive a bounded, non-shrinking backoff.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.max_attempts == 0 {
            return Err(PolicyError::NoAttempts);
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(PolicyError::InvalidMultiplier(self.multiplier));
        }
        if self.initial_interval_ms > self.max_interval_ms {
            return Err(PolicyError::InitialAboveMax {
                initial_ms: self.initial_interval_ms,
                max_ms: self.max_interval_ms,
            });
        }
        Ok(())
    }
}
