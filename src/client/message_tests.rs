//! Tests for HTTP request/response value types.

use super::{HttpClient, HttpError, HttpRequest, HttpResponse};
use std::sync::Arc;

fn test_url() -> url::Url {
    url::Url::parse("https://example.com/rates").unwrap()
}

mod http_request {
    use super::*;

    #[test]
    fn get_sets_method_and_url() {
        let req = HttpRequest::get(test_url());

        assert_eq!(req.method, http::Method::GET);
        assert_eq!(req.url.as_str(), "https://example.com/rates");
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn with_header_appends_duplicate_names() {
        let req = HttpRequest::get(test_url())
            .with_header(
                http::header::ACCEPT,
                http::HeaderValue::from_static("text/html"),
            )
            .with_header(
                http::header::ACCEPT,
                http::HeaderValue::from_static("application/json"),
            );

        assert_eq!(req.headers.get_all(http::header::ACCEPT).iter().count(), 2);
    }

    #[test]
    fn with_json_sets_body_and_content_type() {
        let req = HttpRequest::post(test_url()).with_json(&serde_json::json!({"chat_id": 42}));

        assert_eq!(
            req.headers.get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body: serde_json::Value = serde_json::from_slice(&req.body.unwrap()).unwrap();
        assert_eq!(body["chat_id"], 42);
    }
}

mod http_response {
    use super::*;

    #[test]
    fn is_success_for_2xx() {
        let ok = HttpResponse::with_text(http::StatusCode::OK, "");
        let forbidden = HttpResponse::with_text(http::StatusCode::FORBIDDEN, "");

        assert!(ok.is_success());
        assert!(!forbidden.is_success());
    }

    #[test]
    fn body_text_rejects_invalid_utf8() {
        let response =
            HttpResponse::new(http::StatusCode::OK, http::HeaderMap::new(), vec![0xff, 0xfe]);

        assert!(response.body_text().is_none());
    }

    #[test]
    fn body_text_returns_content() {
        let response = HttpResponse::with_text(http::StatusCode::OK, "27,10");

        assert_eq!(response.body_text(), Some("27,10"));
    }
}

mod arc_client {
    use super::*;

    struct EchoClient;

    impl HttpClient for EchoClient {
        async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
            Ok(HttpResponse::with_text(
                http::StatusCode::OK,
                req.url.to_string(),
            ))
        }
    }

    #[tokio::test]
    async fn arc_delegates_to_inner_client() {
        let client = Arc::new(EchoClient);

        let response = client.request(HttpRequest::get(test_url())).await.unwrap();

        assert_eq!(response.body_text(), Some("https://example.com/rates"));
    }
}

#[test]
fn http_error_timeout_displays_message() {
    assert_eq!(HttpError::Timeout.to_string(), "Request timed out");
}
