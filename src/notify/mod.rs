//! Notification layer: delivering one message to many subscribers.
//!
//! This module provides:
//! - The transport send boundary ([`MessageSender`], [`DeliveryError`])
//! - Broadcast with per-recipient failure handling ([`Dispatcher`], [`BroadcastReport`])

mod dispatcher;
mod sender;


pub use dispatcher::{BroadcastReport, Dispatcher, MAX_CONCURRENT_SENDS};
pub use sender::{DeliveryError, MessageSender};
