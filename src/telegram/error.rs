//! Error types for the Telegram transport.

use thiserror::Error;

use crate::client::HttpError;
use crate::notify::DeliveryError;

/// Error type for Bot API calls.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// The HTTP request failed before a response arrived.
    #[error("Telegram request failed: {0}")]
    Http(#[from] HttpError),

    /// The Bot API rejected the call.
    #[error("Telegram API error {status}: {description}")]
    Api {
        /// HTTP status of the response
        status: http::StatusCode,
        /// `error_code` field, if present
        code: Option<i32>,
        /// `description` field, or the raw body
        description: String,
    },

    /// The response was not the expected JSON.
    #[error("Failed to decode Telegram response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The bot token does not form a valid API URL.
    #[error("Invalid bot token or API base URL: {0}")]
    InvalidEndpoint(String),
}

/// Descriptions the Bot API uses for recipients that are gone for good.
const GONE_DESCRIPTIONS: &[&str] = &[
    "chat not found",
    "user is deactivated",
    "bot was kicked",
    "bot was blocked",
];

impl TelegramError {
    /// Returns true if the recipient can never receive messages again.
    ///
    /// 403 means the user blocked the bot or it was removed from the chat.
    /// Some 400 responses describe a deleted chat or account.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        match self {
            Self::Api {
                status,
                description,
                ..
            } => {
                if *status == http::StatusCode::FORBIDDEN {
                    return true;
                }
                let description = description.to_lowercase();
                *status == http::StatusCode::BAD_REQUEST
                    && GONE_DESCRIPTIONS.iter().any(|d| description.contains(d))
            }
            Self::Http(_) | Self::Decode(_) | Self::InvalidEndpoint(_) => false,
        }
    }
}

impl From<TelegramError> for DeliveryError {
    fn from(error: TelegramError) -> Self {
        if error.is_permanent() {
            Self::permanent(error.to_string())
        } else {
            Self::transient(error.to_string())
        }
    }
}
