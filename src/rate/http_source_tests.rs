//! Tests for `HttpRateSource`.

use super::{FetchError, HttpRateSource, RateExtractor, RateSource};
use crate::client::{HttpClient, HttpError, HttpRequest, HttpResponse};
use crate::time::Clock;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

/// Mock HTTP client that returns a configurable sequence of responses.
#[derive(Debug, Default)]
struct MockClient {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockClient {
    fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn page(rate: &str) -> Self {
        Self::new(vec![Ok(HttpResponse::with_text(
            http::StatusCode::OK,
            format!(r#"<div class="bi rate-value">{rate}</div>"#),
        ))])
    }

    fn captured_requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for MockClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(req);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(HttpError::Timeout))
    }
}

struct FixedClock(u64);

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(self.0)
    }
}

fn test_url() -> url::Url {
    url::Url::parse("https://example.com/rates").unwrap()
}

#[tokio::test]
async fn fetch_returns_extracted_sample() {
    let source =
        HttpRateSource::new(MockClient::page("27,10"), test_url()).with_clock(FixedClock(1_000));

    let sample = source.fetch().await.unwrap();

    assert!((sample.value - 27.10).abs() < f64::EPSILON);
    assert_eq!(
        sample.fetched_at,
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_000)
    );
}

#[tokio::test]
async fn fetch_sends_get_with_user_agent() {
    let client = Arc::new(MockClient::page("27,10"));
    let source = HttpRateSource::new(client.clone(), test_url()).with_user_agent("rate-watch/1");

    source.fetch().await.unwrap();

    let requests = client.captured_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, http::Method::GET);
    assert_eq!(requests[0].url.as_str(), "https://example.com/rates");
    assert_eq!(
        requests[0].headers.get(http::header::USER_AGENT).unwrap(),
        "rate-watch/1"
    );
}

#[tokio::test]
async fn invalid_user_agent_is_skipped() {
    let client = Arc::new(MockClient::page("27,10"));
    let source = HttpRateSource::new(client.clone(), test_url()).with_user_agent("bad\nagent");

    source.fetch().await.unwrap();

    assert!(
        client.captured_requests()[0]
            .headers
            .get(http::header::USER_AGENT)
            .is_none()
    );
}

#[tokio::test]
async fn network_error_maps_to_http_variant() {
    let source = HttpRateSource::new(MockClient::new(vec![Err(HttpError::Timeout)]), test_url());

    let result = source.fetch().await;

    assert!(matches!(result, Err(FetchError::Http(HttpError::Timeout))));
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let client = MockClient::new(vec![Ok(HttpResponse::with_text(
        http::StatusCode::SERVICE_UNAVAILABLE,
        "maintenance",
    ))]);
    let source = HttpRateSource::new(client, test_url());

    let result = source.fetch().await;

    assert!(matches!(
        result,
        Err(FetchError::Status { status }) if status == http::StatusCode::SERVICE_UNAVAILABLE
    ));
}

#[tokio::test]
async fn binary_body_is_invalid_encoding() {
    let client = MockClient::new(vec![Ok(HttpResponse::new(
        http::StatusCode::OK,
        http::HeaderMap::new(),
        vec![0xff, 0x00, 0xfe],
    ))]);
    let source = HttpRateSource::new(client, test_url());

    assert!(matches!(
        source.fetch().await,
        Err(FetchError::InvalidEncoding)
    ));
}

#[tokio::test]
async fn custom_extractor_is_used() {
    let client = MockClient::new(vec![Ok(HttpResponse::with_text(
        http::StatusCode::OK,
        "USD 41.25",
    ))]);
    let source = HttpRateSource::new(client, test_url())
        .with_extractor(RateExtractor::new(r"USD ([0-9.]+)").unwrap());

    let sample = source.fetch().await.unwrap();

    assert!((sample.value - 41.25).abs() < f64::EPSILON);
}

#[tokio::test]
async fn source_is_stateless_between_calls() {
    let client = MockClient::new(vec![
        Err(HttpError::Timeout),
        Ok(HttpResponse::with_text(
            http::StatusCode::OK,
            r#"<div class="bi rate-value">27,30</div>"#,
        )),
    ]);
    let source = HttpRateSource::new(client, test_url());

    assert!(source.fetch().await.is_err());
    let sample = source.fetch().await.unwrap();
    assert!((sample.value - 27.30).abs() < f64::EPSILON);
}
