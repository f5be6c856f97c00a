//! Engine configuration.

use std::time::Duration;

/// Timing policy for the poll scheduler.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Delay between checks while a user is signed in.
    pub poll_interval: Duration,
    /// First retry delay after a non-success outcome.
    pub retry_initial: Duration,
    /// Cap on the exponential retry delay.
    pub retry_max: Duration,
}

impl SessionConfig {
    /// Default policy: 30s healthy interval, 5s initial retry, 60s cap.
    pub fn new() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            retry_initial: Duration::from_secs(5),
            retry_max: Duration::from_secs(60),
        }
    }

    /// Override the healthy poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override the retry bounds.
    pub fn with_retry_bounds(mut self, initial: Duration, max: Duration) -> Self {
        self.retry_initial = initial;
        self.retry_max = max;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}
