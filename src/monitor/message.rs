//! Notification text formatting.

use std::time::SystemTime;

use chrono::{DateTime, Local};
use handlebars::Handlebars;
use serde::Serialize;

/// Format of the timestamp included in notifications.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders the text broadcast when the rate moves.
///
/// Without a custom template the text is a fixed three-line message. A
/// custom template uses Handlebars syntax with two variables:
/// - `rate`: the rate with two decimals
/// - `timestamp`: local time formatted as `YYYY-MM-DD HH:MM:SS`
///
/// # Example
///
/// ```
/// use rate_watch::monitor::NotificationTemplate;
/// use std::time::SystemTime;
///
/// let template = NotificationTemplate::custom("Rate is now {{rate}}");
/// assert_eq!(template.render(27.7, SystemTime::now()), "Rate is now 27.70");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NotificationTemplate {
    /// Built-in text.
    #[default]
    Default,
    /// Handlebars template.
    Custom(String),
}

#[derive(Serialize)]
struct TemplateData {
    rate: String,
    timestamp: String,
}

impl NotificationTemplate {
    /// Creates a custom template.
    #[must_use]
    pub fn custom(template: impl Into<String>) -> Self {
        Self::Custom(template.into())
    }

    /// Renders the notification for `rate` observed at `at`.
    ///
    /// A custom template that fails to render falls back to the built-in
    /// text, so a notification is always produced.
    #[must_use]
    pub fn render(&self, rate: f64, at: SystemTime) -> String {
        let data = TemplateData {
            rate: format!("{rate:.2}"),
            timestamp: format_timestamp(at),
        };

        match self {
            Self::Default => default_text(&data),
            Self::Custom(template) => {
                let mut handlebars = Handlebars::new();
                handlebars.register_escape_fn(handlebars::no_escape);
                handlebars
                    .render_template(template, &data)
                    .unwrap_or_else(|e| {
                        tracing::warn!("Notification template failed, using default: {e}");
                        default_text(&data)
                    })
            }
        }
    }
}

/// Formats `at` in local time with [`TIMESTAMP_FORMAT`].
#[must_use]
pub fn format_timestamp(at: SystemTime) -> String {
    DateTime::<Local>::from(at)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

fn default_text(data: &TemplateData) -> String {
    format!(
        "🔄 Rate update!\n\n📊 Current rate: {}\n⏰ Time: {}",
        data.rate, data.timestamp
    )
}
