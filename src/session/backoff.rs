//! Exponential retry delay for non-success poll outcomes.

use std::time::Duration;

/// Exponential backoff for identity-check retries.
///
/// The delay starts at an initial value, doubles after each consecutive
/// non-success outcome up to a maximum cap, and resets to the initial
/// value on any success or explicit override.
///
/// The scheduler reads [`current`](Self::current) before the advance, so
/// the delay scheduled after the k-th consecutive failure is
/// `min(initial * 2^(k-1), max)`.
#[derive(Debug, Clone)]
pub struct RetryBackoff {
    /// Delay after a reset (first retry).
    initial: Duration,
    /// Delay the next non-success reschedule will use.
    current: Duration,
    /// Maximum delay cap.
    max: Duration,
    /// Number of consecutive non-success outcomes.
    failures: u32,
}

impl RetryBackoff {
    /// Create a backoff with custom bounds.
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            current: initial,
            max,
            failures: 0,
        }
    }

    /// The delay the next non-success reschedule uses.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Record a non-success outcome: double the delay, capped at the max.
    pub fn advance(&mut self) {
        self.failures += 1;
        self.current = (self.current * 2).min(self.max);
        tracing::debug!(
            failures = self.failures,
            next_delay = ?self.current,
            "retry delay advanced"
        );
    }

    /// Reset to the initial delay on success or explicit override.
    pub fn reset(&mut self) {
        if self.failures > 0 {
            tracing::debug!("retry delay reset after {} failures", self.failures);
        }
        self.failures = 0;
        self.current = self.initial;
    }

    /// Number of consecutive non-success outcomes since the last reset.
    pub fn failures(&self) -> u32 {
        self.failures
    }
}
