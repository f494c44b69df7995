//! Minimal HTTP seam shared by the rate page scraper and the Bot API client.
//!
//! Callers build an [`HttpRequest`], hand it to something implementing
//! [`HttpClient`] and inspect the buffered [`HttpResponse`]. Production code
//! plugs in [`ReqwestClient`]; tests plug in scripted fakes.

mod error;
mod message;
mod reqwest_client;

#[cfg(test)]
mod message_tests;

use std::future::Future;
use std::sync::Arc;

pub use error::HttpError;
pub use message::{HttpRequest, HttpResponse};
pub use reqwest_client::ReqwestClient;

/// Sends one request and buffers the reply.
///
/// A 4xx or 5xx status is still `Ok`; interpreting it is the caller's job.
///
/// # Errors
///
/// Only transport problems surface here: [`HttpError::Connection`],
/// [`HttpError::Timeout`] and [`HttpError::InvalidUrl`].
pub trait HttpClient: Send + Sync {
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send;
}

impl<T: HttpClient> HttpClient for Arc<T> {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        (**self).request(req).await
    }
}
