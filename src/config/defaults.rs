//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default delay between rate checks in seconds.
pub const CHECK_INTERVAL_SECS: u64 = 300;

/// Default delay after an unexpected monitoring error in seconds.
pub const ERROR_COOLDOWN_SECS: u64 = 60;

/// Default minimum rate change that triggers a notification.
pub const THRESHOLD: f64 = 0.5;

/// Default rate source request timeout in seconds.
pub const SOURCE_TIMEOUT_SECS: u64 = 30;

/// Default `getUpdates` long-poll wait in seconds.
pub const POLL_TIMEOUT_SECS: u64 = 60;

/// Extra time the Telegram HTTP client waits beyond the long-poll wait.
pub const TELEGRAM_TIMEOUT_GRACE_SECS: u64 = 15;

/// Default initial backoff delay in seconds.
pub const BACKOFF_INITIAL_DELAY_SECS: u64 = 1;

/// Default maximum backoff delay in seconds.
pub const BACKOFF_MAX_DELAY_SECS: u64 = 60;

/// Default backoff multiplier.
pub const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Default check interval as Duration.
#[must_use]
pub const fn check_interval() -> Duration {
    Duration::from_secs(CHECK_INTERVAL_SECS)
}

/// Default error cooldown as Duration.
#[must_use]
pub const fn error_cooldown() -> Duration {
    Duration::from_secs(ERROR_COOLDOWN_SECS)
}

/// Default source timeout as Duration.
#[must_use]
pub const fn source_timeout() -> Duration {
    Duration::from_secs(SOURCE_TIMEOUT_SECS)
}

/// Default long-poll wait as Duration.
#[must_use]
pub const fn poll_timeout() -> Duration {
    Duration::from_secs(POLL_TIMEOUT_SECS)
}
