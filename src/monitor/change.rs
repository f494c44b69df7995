//! Change detection policy.

use std::fmt;

/// Returns true if a sample should be broadcast.
///
/// The first sample (`last` is `None`) always notifies. Afterwards a sample
/// notifies when it differs from the last accepted one by at least
/// `threshold`; the boundary is inclusive, so a threshold of 0 notifies on
/// every sample, including an unchanged one.
///
/// # Example
///
/// ```
/// use rate_watch::monitor::should_notify;
///
/// assert!(should_notify(27.10, None, 0.5));
/// assert!(!should_notify(27.30, Some(27.10), 0.5));
/// assert!(should_notify(27.70, Some(27.10), 0.5));
/// ```
#[must_use]
pub fn should_notify(current: f64, last: Option<f64>, threshold: f64) -> bool {
    last.is_none_or(|last| (current - last).abs() >= threshold)
}

/// Validated notification threshold: finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct RateThreshold(f64);

impl RateThreshold {
    /// Threshold that notifies on every sample.
    pub const ALWAYS: Self = Self(0.0);

    /// Creates a threshold, rejecting negative, NaN and infinite values.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value >= 0.0).then_some(Self(value))
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Applies [`should_notify`] with this threshold.
    #[must_use]
    pub fn should_notify(self, current: f64, last: Option<f64>) -> bool {
        should_notify(current, last, self.0)
    }
}

impl fmt::Display for RateThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
