//! Shape of the `--config` file.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Parsed file contents. Every key is optional; a missing table behaves like
/// an empty one, and unknown keys are rejected so typos surface early.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub telegram: TelegramSection,

    #[serde(default)]
    pub source: SourceSection,

    #[serde(default)]
    pub monitor: MonitorSection,

    /// Waits between failed `getUpdates` calls.
    #[serde(default)]
    pub backoff: BackoffSection,

    #[serde(default)]
    pub messages: MessagesSection,
}

/// `[telegram]`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramSection {
    pub token: Option<String>,

    /// Seconds Telegram may hold a `getUpdates` call open.
    pub poll_timeout: Option<u64>,
}

/// `[source]`: where and how the rate is scraped.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSection {
    pub url: Option<String>,

    /// First capture group is the rate, e.g. `USD ([0-9.,]+)`.
    pub pattern: Option<String>,

    pub user_agent: Option<String>,

    /// Seconds.
    pub timeout: Option<u64>,
}

/// `[monitor]`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorSection {
    /// Seconds.
    pub check_interval: Option<u64>,

    pub threshold: Option<f64>,

    /// Seconds to back off after a fault the loop did not expect.
    pub error_cooldown: Option<u64>,
}

/// `[backoff]`, all in seconds except the multiplier.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackoffSection {
    pub initial_delay: Option<u64>,

    pub max_delay: Option<u64>,

    pub multiplier: Option<f64>,
}

/// `[messages]`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessagesSection {
    /// Handlebars; sees `rate` and `timestamp`.
    pub notification_template: Option<String>,
}

impl TomlConfig {
    /// # Errors
    ///
    /// [`ConfigError::FileRead`] or [`ConfigError::TomlParse`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        std::fs::read_to_string(path)
            .map_err(|source| ConfigError::FileRead {
                path: path.to_path_buf(),
                source,
            })
            .and_then(|text| Self::parse(&text))
    }

    /// # Errors
    ///
    /// [`ConfigError::TomlParse`] for bad syntax, wrong types or unknown keys.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

/// Commented file written by `rate-watch init`. Loading it unchanged still
/// fails until `token` and `url` are filled in.
#[must_use]
pub fn default_config_template() -> String {
    r#"# rate-watch Configuration File

[telegram]
# Bot token from @BotFather (required)
# Can also be set with --token or the TELEGRAM_BOT_TOKEN environment variable
# token = "123456:ABC-DEF"

# Long-poll wait per getUpdates call in seconds (default: 60)
# poll_timeout = 60

[source]
# Page carrying the exchange rate (required)
# url = "https://example.com/rates"

# Regex whose first capture group is the rate text
# Default matches <div class="bi rate-value">27,10</div>
# pattern = '<div[^>]*class="bi rate-value"[^>]*>\s*([^<]+?)\s*</div>'

# User-Agent header sent to the source (default: a desktop browser)
# user_agent = "Mozilla/5.0"

# Request timeout in seconds (default: 30)
# timeout = 30

[monitor]
# Delay between rate checks in seconds (default: 300)
check_interval = 300

# Minimum rate change that triggers a notification (default: 0.5)
threshold = 0.5

# Delay after an unexpected monitoring error in seconds (default: 60)
# error_cooldown = 60

[backoff]
# Delays between failed Telegram update polls
# initial_delay = 1
# max_delay = 60
# multiplier = 2.0

[messages]
# Handlebars template for rate change notifications
# Available variables: {{rate}} (two decimals), {{timestamp}} (YYYY-MM-DD HH:MM:SS)
# notification_template = "Rate is now {{rate}} ({{timestamp}})"
"#
    .to_string()
}
