//! Error types for the monitor layer.

use thiserror::Error;

/// Unexpected fault inside a monitoring cycle.
///
/// Fetch failures are not errors at this level; they are an ordinary
/// [`super::CycleOutcome`]. These variants mean something broke a contract,
/// and the loop backs off for the longer error cooldown.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The rate source returned a NaN or infinite value.
    #[error("Rate source returned a non-finite value: {value}")]
    NonFiniteRate {
        /// The rejected value
        value: f64,
    },

    /// A collaborator panicked while the cycle was running.
    #[error("Monitoring cycle panicked: {message}")]
    CyclePanicked {
        /// Panic payload, if it was a string
        message: String,
    },
}

impl MonitorError {
    /// Builds a [`MonitorError::CyclePanicked`] from a panic payload.
    #[must_use]
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());

        Self::CyclePanicked { message }
    }
}
