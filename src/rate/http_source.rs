//! HTTP-backed rate source.

use http::HeaderValue;
use http::header::USER_AGENT;

use super::{FetchError, RateExtractor, RateSample, RateSource};
use crate::client::{HttpClient, HttpRequest};
use crate::time::{Clock, SystemClock};

/// Browser-like user agent; some rate pages refuse obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetches a page over HTTP and extracts the rate from it.
///
/// The request timeout belongs to the injected [`HttpClient`].
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `C`: The clock used to stamp samples (defaults to [`SystemClock`])
///
/// # Example
///
/// ```
/// use rate_watch::client::ReqwestClient;
/// use rate_watch::rate::HttpRateSource;
/// use url::Url;
///
/// let source = HttpRateSource::new(
///     ReqwestClient::new(),
///     Url::parse("https://example.com/rates").unwrap(),
/// );
/// assert_eq!(source.url().as_str(), "https://example.com/rates");
/// ```
#[derive(Debug, Clone)]
pub struct HttpRateSource<H, C = SystemClock> {
    client: H,
    clock: C,
    url: url::Url,
    user_agent: String,
    extractor: RateExtractor,
}

impl<H> HttpRateSource<H, SystemClock> {
    /// Creates a source with the default extractor and user agent.
    #[must_use]
    pub fn new(client: H, url: url::Url) -> Self {
        Self {
            client,
            clock: SystemClock,
            url,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            extractor: RateExtractor::default(),
        }
    }
}

impl<H, C> HttpRateSource<H, C> {
    /// Replaces the clock used to stamp samples.
    #[must_use]
    pub fn with_clock<C2>(self, clock: C2) -> HttpRateSource<H, C2> {
        HttpRateSource {
            client: self.client,
            clock,
            url: self.url,
            user_agent: self.user_agent,
            extractor: self.extractor,
        }
    }

    /// Sets the extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: RateExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Sets the `User-Agent` header value.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the page URL.
    #[must_use]
    pub const fn url(&self) -> &url::Url {
        &self.url
    }
}

impl<H: HttpClient, C: Clock> HttpRateSource<H, C> {
    fn build_request(&self) -> HttpRequest {
        let request = HttpRequest::get(self.url.clone());
        match HeaderValue::from_str(&self.user_agent) {
            Ok(value) => request.with_header(USER_AGENT, value),
            Err(_) => {
                tracing::debug!("Skipping invalid User-Agent header value");
                request
            }
        }
    }
}

impl<H: HttpClient, C: Clock> RateSource for HttpRateSource<H, C> {
    async fn fetch(&self) -> Result<RateSample, FetchError> {
        let response = self.client.request(self.build_request()).await?;

        if !response.is_success() {
            return Err(FetchError::Status {
                status: response.status,
            });
        }

        let body = response.body_text().ok_or(FetchError::InvalidEncoding)?;
        let value = self.extractor.extract(body)?;

        Ok(RateSample::new(value, self.clock.now()))
    }
}
