//! Bot API payload types.
//!
//! Only the fields the bot reads are modelled; unknown fields are ignored.

use serde::Deserialize;

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
pub(super) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub error_code: Option<i32>,
    pub description: Option<String>,
}

/// An incoming update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Update {
    /// Monotonic update identifier.
    pub update_id: i64,
    /// New incoming message, if this update carries one.
    pub message: Option<Message>,
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    /// Identifier inside the chat.
    pub message_id: i64,
    /// Chat the message belongs to.
    pub chat: Chat,
    /// Sender, absent for channel posts.
    pub from: Option<User>,
    /// Text, absent for media messages.
    pub text: Option<String>,
}

/// A chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Chat {
    /// Chat identifier; negative for groups.
    pub id: i64,
}

/// A Telegram user or bot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: i64,
    /// Username without the leading `@`.
    pub username: Option<String>,
}
