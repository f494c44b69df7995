//! Retry pacing for the update long poll.

use std::time::Duration;

/// Exponential wait between failed `getUpdates` calls.
///
/// There is no attempt limit. The poller keeps a failure counter, asks for
/// [`delay_for_failure`](Self::delay_for_failure) after each miss and resets
/// the counter once a poll gets through.
///
/// ```
/// use rate_watch::telegram::BackoffPolicy;
/// use std::time::Duration;
///
/// let policy = BackoffPolicy::new().with_max_delay(Duration::from_secs(5));
/// assert_eq!(policy.delay_for_failure(1), Duration::from_secs(1));
/// assert_eq!(policy.delay_for_failure(3), Duration::from_secs(4));
/// assert_eq!(policy.delay_for_failure(10), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    /// Wait after the first failure of a run.
    pub initial_delay: Duration,
    /// Ceiling no computed wait exceeds.
    pub max_delay: Duration,
    /// Growth factor per additional consecutive failure.
    pub multiplier: f64,
}

impl BackoffPolicy {
    /// One second.
    pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);
    /// One minute.
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);
    /// Doubling.
    pub const DEFAULT_MULTIPLIER: f64 = 2.0;

    /// 1s, doubling, capped at one minute.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initial_delay: Self::DEFAULT_INITIAL_DELAY,
            max_delay: Self::DEFAULT_MAX_DELAY,
            multiplier: Self::DEFAULT_MULTIPLIER,
        }
    }

    /// Sets the wait after the first failure.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the ceiling.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the growth factor.
    ///
    /// # Panics
    ///
    /// If `multiplier` is zero or negative. Configuration validation rejects
    /// such values before a policy is built.
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        assert!(multiplier > 0.0, "multiplier must be positive");
        self.multiplier = multiplier;
        self
    }

    /// `initial_delay * multiplier^(failures - 1)`, never above `max_delay`.
    ///
    /// `failures` counts consecutive misses including the current one, so
    /// zero means nothing has failed and no wait is due.
    #[must_use]
    pub fn delay_for_failure(&self, failures: u32) -> Duration {
        let Some(retries) = failures.checked_sub(1) else {
            return Duration::ZERO;
        };
        let exponent = i32::try_from(retries).unwrap_or(i32::MAX);
        let grown = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);

        // Near `u64::MAX` seconds the float round trip overflows `Duration`.
        Duration::try_from_secs_f64(grown.min(self.max_delay.as_secs_f64()))
            .unwrap_or(self.max_delay)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new()
    }
}
