use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop configuration from loading.
///
/// Every variant is reported before the runtime starts and maps to the
/// configuration exit status.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// `init` could not create the template file.
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Neither the command line, the environment nor the file supplied
    /// `field`. `hint` names where it can be set.
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired {
        field: &'static str,
        hint: &'static str,
    },

    /// The token would break the `/bot<token>/` API path.
    #[error("Invalid bot token: {reason}")]
    InvalidToken { reason: &'static str },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The pattern compiles but has no group to read the rate from.
    #[error("Pattern '{pattern}' has no capture group for the rate value")]
    MissingCaptureGroup { pattern: String },

    #[error("Invalid duration for {field}: {reason}")]
    InvalidDuration { field: &'static str, reason: String },

    #[error("Invalid threshold {value}: must be a finite number >= 0")]
    InvalidThreshold { value: f64 },

    #[error("Invalid backoff configuration: {0}")]
    InvalidBackoff(String),

    #[error("Invalid user agent '{value}': {reason}")]
    InvalidUserAgent { value: String, reason: String },

    /// Handlebars refused to compile or render the notification template.
    #[error("Invalid notification template: {reason}")]
    InvalidTemplate { reason: String },
}

/// Names used in [`ConfigError::MissingRequired`], so callers can match on
/// them without repeating string literals.
pub mod field {
    pub const TOKEN: &str = "token";
    pub const SOURCE_URL: &str = "source_url";
}

impl ConfigError {
    #[must_use]
    pub const fn missing(field: &'static str, hint: &'static str) -> Self {
        Self::MissingRequired { field, hint }
    }
}
