//! Rate source layer.
//!
//! This module provides:
//! - The rate observation type ([`RateSample`])
//! - The source abstraction used by the monitor and command handlers ([`RateSource`])
//! - Error handling ([`FetchError`])
//! - Rate text extraction from an HTML page ([`RateExtractor`])
//! - The production HTTP-backed source ([`HttpRateSource`])

mod extractor;
mod http_source;
mod source;

#[cfg(test)]
mod http_source_tests;

pub use extractor::{DEFAULT_PATTERN, RateExtractor};
pub use http_source::{DEFAULT_USER_AGENT, HttpRateSource};
pub use source::{FetchError, RateSample, RateSource};
