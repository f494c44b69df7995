//! Telegram Bot API transport.
//!
//! This module provides:
//! - The Bot API client ([`TelegramClient`]) implementing the send boundary
//!   ([`crate::notify::MessageSender`]) and long-polling for updates
//! - Update payload types ([`Update`], [`Message`], [`Chat`], [`User`])
//! - Error handling and delivery classification ([`TelegramError`])
//! - Exponential backoff for the update poller ([`BackoffPolicy`])

mod api;
mod backoff;
mod error;
mod types;


pub use api::{DEFAULT_API_BASE, TelegramClient};
pub use backoff::BackoffPolicy;
pub use error::TelegramError;
pub use types::{Chat, Message, Update, User};
