//! Retry configuration for directory lookups.
//!
//! Directory servers shed load, referrals time out, and replication lag can
//! briefly hide a group. Lookups that fail with a retryable
//! [`DirectoryError`](crate::errors::DirectoryError) are retried according
//! to this configuration before the branch is recorded as a lookup failure.
//!
//! ```toml
//! [retry]
//! enabled = true
//! max_retries = 2
//! base_delay_ms = 250
//! strategy = "exponential"
//! timeout_seconds = 30
//! jitter_factor = 0.1
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry policy for transient directory failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Enable automatic retries (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Retries after the first attempt (default: 2)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries in milliseconds (default: 250)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default)]
    pub strategy: RetryStrategy,

    /// Upper bound on time spent retrying one lookup (default: 30)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Jitter as a fraction of the delay (default: 0.1)
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            strategy: RetryStrategy::default(),
            timeout_seconds: default_timeout_seconds(),
            jitter_factor: default_jitter_factor(),
        }
    }
}

impl RetryConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Delay before retry `attempt` (1-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay_ms as f64;

        let delay_ms = match self.strategy {
            RetryStrategy::Constant => base_ms,
            RetryStrategy::Linear => base_ms * (attempt as f64),
            RetryStrategy::Exponential => base_ms * 2.0_f64.powi(attempt as i32 - 1),
            RetryStrategy::Fibonacci => base_ms * (fibonacci(attempt) as f64),
        };

        let jittered_ms = if self.jitter_factor > 0.0 {
            apply_jitter(delay_ms, self.jitter_factor)
        } else {
            delay_ms
        };

        let capped_ms = jittered_ms.min((self.timeout_seconds * 1000) as f64);
        Duration::from_millis(capped_ms as u64).min(self.base_delay() * 100)
    }

    /// `attempt` counts retries already made.
    pub fn should_retry(&self, attempt: u32, elapsed: Duration) -> bool {
        self.enabled && attempt < self.max_retries && elapsed < self.timeout()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryStrategy {
    /// Same delay between each retry.
    Constant,
    /// base * attempt
    Linear,
    /// base * 2^(attempt-1)
    #[default]
    Exponential,
    /// base * fib(attempt)
    Fibonacci,
}

fn default_enabled() -> bool {
    true
}

fn default_max_retries() -> u32 {
    2
}

fn default_base_delay_ms() -> u64 {
    250
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_jitter_factor() -> f64 {
    0.1
}

fn fibonacci(n: u32) -> u64 {
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 0..n {
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    a
}

/// Deterministic jitter: half of the allowed range, so scans stay reproducible.
fn apply_jitter(delay_ms: f64, factor: f64) -> f64 {
    delay_ms + delay_ms * factor * 0.5
}
