//! Rate source trait, sample type and error types.

use std::future::Future;
use std::sync::Arc;
use std::time::SystemTime;

use thiserror::Error;

use crate::client::HttpError;

/// A single observation of the exchange rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSample {
    /// The observed rate. Always finite.
    pub value: f64,
    /// When the observation was obtained.
    pub fetched_at: SystemTime,
}

impl RateSample {
    /// Creates a new sample.
    #[must_use]
    pub const fn new(value: f64, fetched_at: SystemTime) -> Self {
        Self { value, fetched_at }
    }
}

/// Error type for rate fetching operations.
///
/// Every variant is treated as transient by callers: the monitor waits and
/// tries again on its next cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP request itself failed.
    #[error("Request failed: {0}")]
    Http(#[from] HttpError),

    /// The source answered with a non-success status.
    #[error("Rate source returned HTTP {status}")]
    Status {
        /// Status code returned by the source
        status: http::StatusCode,
    },

    /// The response body is not valid UTF-8.
    #[error("Response body is not valid UTF-8")]
    InvalidEncoding,

    /// The configured pattern did not match the response.
    #[error("Rate not found in response")]
    NotFound,

    /// The matched text is not a number.
    #[error("Cannot parse rate from '{text}'")]
    Parse {
        /// The text captured by the pattern
        text: String,
    },

    /// The parsed value is NaN or infinite.
    #[error("Rate value is not finite: {value}")]
    NonFinite {
        /// The rejected value
        value: f64,
    },
}

/// Trait for obtaining the current exchange rate.
///
/// # Contract
///
/// - Every failure resolves to a [`FetchError`]; implementations never panic
///   on bad input from the remote side.
/// - A successful sample carries a finite value.
/// - Implementations hold no state between calls that affects the result.
///
/// # Example
///
/// ```ignore
/// use rate_watch::rate::{FetchError, RateSample, RateSource};
///
/// struct FixedSource(f64);
///
/// impl RateSource for FixedSource {
///     async fn fetch(&self) -> Result<RateSample, FetchError> {
///         Ok(RateSample::new(self.0, std::time::SystemTime::now()))
///     }
/// }
/// ```
pub trait RateSource: Send + Sync {
    /// Fetches the current rate.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on network errors, unexpected responses,
    /// missing data or unparsable values.
    fn fetch(&self) -> impl Future<Output = Result<RateSample, FetchError>> + Send;
}

impl<T: RateSource> RateSource for Arc<T> {
    async fn fetch(&self) -> Result<RateSample, FetchError> {
        (**self).fetch().await
    }
}
