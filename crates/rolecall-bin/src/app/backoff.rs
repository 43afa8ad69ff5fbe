//! Exponential backoff for update polling failures.

use std::time::Duration;

const BACKOFF_BASE: Duration = Duration::from_secs(1);
const BACKOFF_MAX: Duration = Duration::from_secs(30);
const BACKOFF_CAP_EXPONENT: u32 = 5;

#[derive(Debug, Default)]
pub(crate) struct PollBackoff {
    pub(crate) failures: u32,
}

impl PollBackoff {
    pub(crate) fn reset(&mut self) {
        self.failures = 0;
    }

    /// Record a failure and return how long to wait before the next poll.
    pub(crate) fn next_delay(&mut self) -> Duration {
        let shift = self.failures.min(BACKOFF_CAP_EXPONENT);
        self.failures = self.failures.saturating_add(1);
        let delay = BACKOFF_BASE.saturating_mul(1u32 << shift);
        delay.min(BACKOFF_MAX)
    }
}
