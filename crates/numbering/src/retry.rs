//! Retry policy for compare-and-swap allocation
//!
//! A stale commit means another writer issued the number we computed. The
//! whole read → allocate → commit cycle is retried from a fresh read, so a
//! retry never skips a number.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for allocation retry on counter conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = no retries)
    pub max_retries: usize,
    /// Base delay between retries in milliseconds (exponential backoff)
    pub base_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 16,
            base_delay_ms: 1,
            max_delay_ms: 50,
        }
    }
}

impl RetryConfig {
    /// Fail on the first conflict
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Backoff before retry `attempt` (0-based): base × 2^attempt, capped
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let factor = u32::try_from(attempt)
            .ok()
            .and_then(|shift| 1u64.checked_shl(shift))
            .unwrap_or(u64::MAX);
        let delay_ms = self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}
