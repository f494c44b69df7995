//! Bot API client.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::json;

use super::TelegramError;
use super::types::{ApiResponse, Update, User};
use crate::client::{HttpClient, HttpRequest, HttpResponse};
use crate::notify::{DeliveryError, MessageSender};
use crate::subscribers::SubscriberId;

/// Public Bot API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Client for the subset of the Bot API the bot uses.
///
/// All calls are JSON `POST`s to `<base>/bot<token>/<method>`.
///
/// # Example
///
/// ```
/// use rate_watch::client::ReqwestClient;
/// use rate_watch::telegram::TelegramClient;
///
/// let client = TelegramClient::new(ReqwestClient::new(), "123:abc").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct TelegramClient<H> {
    client: H,
    endpoint: url::Url,
}

impl<H: HttpClient> TelegramClient<H> {
    /// Creates a client for the public Bot API.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError::InvalidEndpoint`] if the token contains
    /// characters that cannot appear in a URL path.
    pub fn new(client: H, token: &str) -> Result<Self, TelegramError> {
        Self::with_api_base(client, DEFAULT_API_BASE, token)
    }

    /// Creates a client for a custom Bot API server.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError::InvalidEndpoint`] if the base URL or token
    /// do not form a valid URL.
    pub fn with_api_base(client: H, api_base: &str, token: &str) -> Result<Self, TelegramError> {
        if token.is_empty() || token.contains('/') {
            return Err(TelegramError::InvalidEndpoint(
                "token must be non-empty and contain no '/'".to_string(),
            ));
        }

        let base = format!("{}/bot{token}/", api_base.trim_end_matches('/'));
        let endpoint =
            url::Url::parse(&base).map_err(|e| TelegramError::InvalidEndpoint(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    /// Returns the bot's own account, validating the token.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError`] on transport, API or decoding failures.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &json!({})).await
    }

    /// Long-polls for updates after `offset`.
    ///
    /// `timeout` is the server-side wait; the HTTP client timeout must be
    /// longer for the call to succeed on a quiet bot.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError`] on transport, API or decoding failures.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> Result<Vec<Update>, TelegramError> {
        let mut params = json!({
            "timeout": timeout.as_secs(),
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            params["offset"] = json!(offset);
        }

        self.call("getUpdates", &params).await
    }

    /// Sends a text message, optionally as a reply.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError`] on transport, API or decoding failures.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<(), TelegramError> {
        let mut params = json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(message_id) = reply_to {
            params["reply_parameters"] = json!({
                "message_id": message_id,
                "allow_sending_without_reply": true,
            });
        }

        let _: serde_json::Value = self.call("sendMessage", &params).await?;
        Ok(())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &serde_json::Value,
    ) -> Result<T, TelegramError> {
        let url = self
            .endpoint
            .join(method)
            .map_err(|e| TelegramError::InvalidEndpoint(e.to_string()))?;

        let response = self
            .client
            .request(HttpRequest::post(url).with_json(params))
            .await?;

        decode_response(&response)
    }
}

fn decode_response<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, TelegramError> {
    let envelope: ApiResponse<T> = match serde_json::from_slice(&response.body) {
        Ok(envelope) => envelope,
        // Proxies and outages answer with HTML; keep the status visible.
        Err(_) if !response.is_success() => {
            return Err(TelegramError::Api {
                status: response.status,
                code: None,
                description: response.body_text().unwrap_or_default().trim().to_string(),
            });
        }
        Err(e) => return Err(TelegramError::Decode(e)),
    };

    match envelope {
        ApiResponse {
            ok: true,
            result: Some(result),
            ..
        } => Ok(result),
        ApiResponse {
            error_code,
            description,
            ..
        } => Err(TelegramError::Api {
            status: response.status,
            code: error_code,
            description: description.unwrap_or_else(|| "no description".to_string()),
        }),
    }
}

impl<H: HttpClient> MessageSender for TelegramClient<H> {
    async fn send(&self, recipient: SubscriberId, text: &str) -> Result<(), DeliveryError> {
        self.send_message(recipient.0, text, None)
            .await
            .map_err(DeliveryError::from)
    }
}
