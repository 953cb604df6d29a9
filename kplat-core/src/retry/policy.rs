//! Retry policy: attempt budget, backoff curve and timeouts

use std::time::Duration;

use rand::Rng;

use crate::ConfigError;

/// Whether an outbound call may be safely repeated.
///
/// Only idempotent calls are retried; non-idempotent calls get exactly one
/// attempt regardless of `max_attempts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Idempotency {
    Idempotent,
    NonIdempotent,
}

/// Retry policy applied to each outbound call
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Growth factor between consecutive retries
    pub multiplier: f64,
    /// Upper bound of the uniform random jitter added to each delay
    pub max_jitter: Duration,
    /// Timeout for a single attempt
    pub attempt_timeout: Duration,
    /// Bound on the whole call, backoff included
    pub total_deadline: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_jitter: Duration::from_millis(250),
            attempt_timeout: Duration::from_secs(5),
            total_deadline: Duration::from_secs(15),
        }
    }
}

impl RetryPolicy {
    /// Check the policy for values that would make retries unbounded or meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::out_of_range(
                "max_attempts",
                "must be at least 1",
            ));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(ConfigError::out_of_range(
                "multiplier",
                format!("must be a finite number >= 1.0, got {}", self.multiplier),
            ));
        }
        if self.attempt_timeout.is_zero() {
            return Err(ConfigError::out_of_range(
                "attempt_timeout",
                "must be greater than zero",
            ));
        }
        if self.total_deadline.is_zero() {
            return Err(ConfigError::out_of_range(
                "total_deadline",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Attempt budget for a call of the given idempotency.
    pub fn attempts_for(&self, idempotency: Idempotency) -> u32 {
        match idempotency {
            Idempotency::Idempotent => self.max_attempts,
            Idempotency::NonIdempotent => 1,
        }
    }

    /// Backoff before retry number `retry` (1 = first retry), without jitter.
    ///
    /// `base_delay * multiplier^(retry - 1)`, saturating at `total_deadline`:
    /// any delay that long fails the deadline check anyway.
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(secs)
            .unwrap_or(self.total_deadline)
            .min(self.total_deadline)
    }

    /// Backoff plus the given jitter sample.
    pub fn delay_for(&self, retry: u32, jitter: Duration) -> Duration {
        self.backoff(retry).saturating_add(jitter)
    }

    /// Draw a jitter sample uniformly from `[0, max_jitter]`.
    pub fn sample_jitter(&self) -> Duration {
        let max = self.max_jitter.as_micros().min(u64::MAX as u128) as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(rand::thread_rng().gen_range(0..=max))
    }

    /// Sum of the jitter-free backoff delays over `retries` retries.
    pub fn total_backoff(&self, retries: u32) -> Duration {
        (1..=retries).fold(Duration::ZERO, |acc, retry| {
            acc.saturating_add(self.backoff(retry))
        })
    }
}
