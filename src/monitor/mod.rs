//! Monitor layer: the polling loop and its change-detection policy.
//!
//! This module provides:
//! - The change-detection policy ([`should_notify`], [`RateThreshold`])
//! - Notification text rendering ([`NotificationTemplate`])
//! - The polling loop ([`RateMonitor`], [`MonitorSettings`], [`CycleOutcome`])
//! - Lifecycle control ([`MonitorHandle`], [`MonitorState`])
//! - Error handling ([`MonitorError`])

mod change;
mod error;
mod lifecycle;
mod message;
mod rate_monitor;

#[cfg(test)]
mod rate_monitor_tests;

pub use change::{RateThreshold, should_notify};
pub use error::MonitorError;
pub use lifecycle::{MonitorHandle, MonitorState};
pub use message::{NotificationTemplate, TIMESTAMP_FORMAT, format_timestamp};
pub use rate_monitor::{CycleOutcome, MonitorSettings, RateMonitor};
