//! Back-off configuration for receive-error retries.

use std::time::Duration;

const MIN_DELAY: Duration = Duration::from_millis(1);

/// Exponential back-off applied after a receive error.
///
/// The delay starts at `initial_delay`, doubles on each consecutive error
/// and is capped at `max_delay`. A successful receive or an idle read
/// deadline resets it.
///
/// # Default Values
/// - `initial_delay`: 10 milliseconds
/// - `max_delay`: 1 second
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Delay after the first receive error.
    pub initial_delay: Duration,
    /// Upper bound on the delay between retries.
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
        }
    }
}

impl BackoffConfig {
    /// Clamp the initial delay to at least 1 ms and raise `max_delay` to
    /// match it when it is smaller.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use mavsniff::session::BackoffConfig;
    ///
    /// let cfg = BackoffConfig {
    ///     initial_delay: Duration::from_millis(5),
    ///     max_delay: Duration::ZERO,
    /// };
    ///
    /// let normalized = cfg.normalized();
    /// assert_eq!(normalized.initial_delay, Duration::from_millis(5));
    /// assert_eq!(normalized.max_delay, Duration::from_millis(5));
    /// ```
    #[must_use]
    pub fn normalized(self) -> Self {
        let initial_delay = self.initial_delay.max(MIN_DELAY);
        Self {
            initial_delay,
            max_delay: self.max_delay.max(initial_delay),
        }
    }

    /// Keep every retry no longer than `read_deadline`, so a receive error
    /// never stalls the loop longer than an idle poll would.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use mavsniff::session::BackoffConfig;
    ///
    /// let cfg = BackoffConfig::default().capped_at(Duration::from_millis(200));
    /// assert_eq!(cfg.initial_delay, Duration::from_millis(10));
    /// assert_eq!(cfg.max_delay, Duration::from_millis(200));
    /// ```
    #[must_use]
    pub fn capped_at(self, read_deadline: Duration) -> Self {
        let cap = read_deadline.max(MIN_DELAY);
        let normalized = self.normalized();
        Self {
            initial_delay: normalized.initial_delay.min(cap),
            max_delay: normalized.max_delay.min(cap),
        }
    }

    /// Delay to use after one more consecutive error.
    #[must_use]
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_delay)
    }
}
