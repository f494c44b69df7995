use std::time::Duration;

use super::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// [`HttpClient`] on top of a pooled `reqwest::Client`.
///
/// Clones share the pool. Use one instance per remote so each gets its own
/// timeout: the Telegram client needs room for a full long poll while the
/// rate page should fail fast.
///
/// ```no_run
/// use rate_watch::client::{HttpClient, HttpRequest, ReqwestClient};
/// use std::time::Duration;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ReqwestClient::with_timeout(Duration::from_secs(30))?;
/// let page = client
///     .request(HttpRequest::get("https://example.com/rates".parse()?))
///     .await?;
/// println!("{}", page.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Client with reqwest's defaults and no overall timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Client whose requests, body included, are abandoned after `timeout`.
    ///
    /// # Errors
    ///
    /// [`HttpError::Setup`] when reqwest cannot initialize its TLS backend.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map(|inner| Self { inner })
            .map_err(|e| HttpError::Setup(e.to_string()))
    }
}

fn classify(error: reqwest::Error) -> HttpError {
    if error.is_timeout() {
        HttpError::Timeout
    } else if error.is_builder() {
        HttpError::InvalidUrl(error.to_string())
    } else {
        HttpError::Connection(Box::new(error))
    }
}

impl HttpClient for ReqwestClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = req;

        let mut outgoing = self.inner.request(method, url).headers(headers);
        if let Some(body) = body {
            outgoing = outgoing.body(body);
        }

        let response = outgoing.send().await.map_err(classify)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(classify)?;

        Ok(HttpResponse::new(status, headers, body.to_vec()))
    }
}
