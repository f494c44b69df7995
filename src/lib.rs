//! rate-watch: exchange rate monitoring with Telegram notifications
//!
//! A library for periodically sampling an exchange rate from a web page,
//! detecting significant moves, and broadcasting them to subscribed
//! Telegram chats.

pub mod bot;
pub mod client;
pub mod config;
pub mod monitor;
pub mod notify;
pub mod rate;
pub mod subscribers;
pub mod telegram;
pub mod time;
