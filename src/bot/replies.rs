//! Reply texts for bot commands.

use crate::monitor::RateThreshold;

const COMMAND_LIST: &str = "/subscribe - Subscribe to rate notifications\n\
    /unsubscribe - Unsubscribe from notifications\n\
    /current - Show the current rate\n\
    /status - Show your subscription status\n\
    /help - Show this message";

/// Reply to `/start`.
#[must_use]
pub fn welcome(threshold: RateThreshold) -> String {
    format!(
        "👋 Hi! I monitor the exchange rate.\n\n\
         Available commands:\n{COMMAND_LIST}\n\n\
         I will notify you when the rate changes by {threshold} or more."
    )
}

/// Reply to `/help`.
#[must_use]
pub fn help(threshold: RateThreshold) -> String {
    format!(
        "📌 Available commands:\n\n{COMMAND_LIST}\n\n\
         ❗️ Notifications are sent when the rate changes by {threshold} or more."
    )
}

/// Reply to a successful `/subscribe`.
pub const SUBSCRIBED: &str = "✅ You have subscribed to rate change notifications!";

/// Reply to `/subscribe` from an existing subscriber.
pub const ALREADY_SUBSCRIBED: &str = "ℹ️ You are already subscribed.";

/// Reply to a successful `/unsubscribe`.
pub const UNSUBSCRIBED: &str = "✅ You have unsubscribed from notifications.";

/// Reply to `/unsubscribe` from a non-subscriber.
pub const NOT_SUBSCRIBED: &str = "ℹ️ You were not subscribed.";

/// Reply to `/current` when the source failed.
pub const CURRENT_UNAVAILABLE: &str = "❌ Could not get the current rate. Please try again later.";

/// Reply to a successful `/current`.
#[must_use]
pub fn current_rate(rate: f64) -> String {
    format!("📊 Current exchange rate: {rate:.2}")
}

/// Reply to `/status`.
#[must_use]
pub fn status(subscribed: bool, subscribers: usize) -> String {
    let state = if subscribed {
        "✅ You are subscribed."
    } else {
        "ℹ️ You are not subscribed."
    };
    format!("{state}\n👥 Subscribers: {subscribers}")
}
