//! Backoff between retries of transient failures.

use std::time::Duration;

use rand::Rng;

use crate::error::ComparisonError;
use crate::types::CompareConfig;

const MIN_BACKOFF: Duration = Duration::from_millis(10);
const MIN_RETRY_AFTER: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub(crate) max_retries: u32,
    pub(crate) base_backoff: Duration,
    pub(crate) max_backoff: Duration,
}

impl RetryPolicy {
    pub(crate) fn from_config(config: &CompareConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_backoff: Duration::from_millis(config.base_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }

    /// Delay before retry number `retry` (1-based) after `err`.
    ///
    /// A service-provided retry-after wins over the exponential schedule.
    pub(crate) fn backoff(&self, retry: u32, err: &ComparisonError) -> Duration {
        match err {
            ComparisonError::RemoteUnavailable {
                retry_after: Some(retry_after),
                ..
            } => {
                let capped = (*retry_after).min(self.max_backoff);
                let base_ms = capped.as_millis() as u64;
                let jitter_factor: f64 = rand::thread_rng().gen_range(0.9_f64..=1.1_f64);
                let jittered_ms = ((base_ms as f64) * jitter_factor).round() as u64;
                Duration::from_millis(jittered_ms).max(MIN_RETRY_AFTER)
            }
            _ => {
                let ceiling = self.exponential(retry);
                let jittered_ms =
                    rand::thread_rng().gen_range(0..=ceiling.as_millis() as u64);
                Duration::from_millis(jittered_ms).max(MIN_BACKOFF)
            }
        }
    }

    /// Upper bound of the full-jitter window for retry number `retry`.
    fn exponential(&self, retry: u32) -> Duration {
        let factor = 1u32
            .checked_shl(retry.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}
