//! Retry policy for admin API requests.
//!
//! Failures retry up to a fixed count with linearly increasing delay.
//! Statuses on the exclusion list mean the request itself was bad, so
//! resubmitting it verbatim cannot help; those fail immediately.

use std::time::Duration;

use crate::Error;

/// Default retry count after the initial attempt.
pub const MAX_RETRIES: u32 = 3;

/// Delay unit; attempt `n` waits `n` times this.
pub const RETRY_DELAY_UNIT: Duration = Duration::from_millis(1000);

/// Statuses that never retry.
pub const NO_RETRY_STATUSES: &[u16] = &[400, 422];

/// Retry schedule for admin API calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay_unit: Duration,
    pub excluded_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            delay_unit: RETRY_DELAY_UNIT,
            excluded_statuses: NO_RETRY_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry attempt `attempt` (1-based): linear growth.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.delay_unit * attempt
    }

    /// Decide whether `error` warrants retry number `attempt`.
    ///
    /// Returns the delay to wait, or `None` when the error is terminal.
    pub fn next_delay(&self, error: &Error, attempt: u32) -> Option<Duration> {
        if attempt > self.max_retries {
            return None;
        }
        if let Some(status) = error.status() {
            if self.excluded_statuses.contains(&status) {
                return None;
            }
        }
        Some(self.delay_for(attempt))
    }
}
