//! Merging of the command line with the optional file, plus every check
//! that has to pass before the bot starts.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use handlebars::Handlebars;
use http::HeaderValue;
use url::Url;

use crate::monitor::{MonitorSettings, NotificationTemplate, RateThreshold};
use crate::rate::{DEFAULT_PATTERN, DEFAULT_USER_AGENT, RateExtractor};
use crate::telegram::BackoffPolicy;

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::{TomlConfig, default_config_template};

/// Settings the runtime is built from.
///
/// Obtained only through [`from_raw`](Self::from_raw) or
/// [`load`](Self::load); holding one means every required value was found
/// and every value passed its checks. `Display` masks the token secret so
/// the whole struct can be logged at startup.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Trimmed, without `/` or whitespace.
    pub token: String,
    pub poll_timeout: Duration,

    /// Always `http` or `https`.
    pub source_url: Url,
    /// Guaranteed to have a capture group.
    pub extractor: RateExtractor,
    /// Known to be a legal header value.
    pub user_agent: String,
    pub source_timeout: Duration,

    pub check_interval: Duration,
    pub error_cooldown: Duration,
    pub threshold: RateThreshold,

    pub backoff: BackoffPolicy,
    pub template: NotificationTemplate,
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let template = match self.template {
            NotificationTemplate::Default => "default",
            NotificationTemplate::Custom(_) => "custom",
        };

        write!(
            f,
            "Config {{ source: {}, check_interval: {}s, threshold: {}, error_cooldown: {}s, \
             timeout: {}s, poll_timeout: {}s, backoff: {}s..{}s, template: {}, token: {} }}",
            self.source_url,
            self.check_interval.as_secs(),
            self.threshold,
            self.error_cooldown.as_secs(),
            self.source_timeout.as_secs(),
            self.poll_timeout.as_secs(),
            self.backoff.initial_delay.as_secs(),
            self.backoff.max_delay.as_secs(),
            template,
            mask_token(&self.token),
        )
    }
}

impl ValidatedConfig {
    /// Merges `cli` over `toml` over [`defaults`] and checks the result.
    ///
    /// # Errors
    ///
    /// The first problem found, in field order: token, poll timeout, source
    /// URL, pattern, user agent, the three durations, threshold, backoff and
    /// finally the template.
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let token = Self::resolve_token(cli, toml)?;
        let poll_timeout = positive_duration(
            "poll_timeout",
            toml.and_then(|t| t.telegram.poll_timeout),
            defaults::POLL_TIMEOUT_SECS,
        )?;

        let source_url = Self::resolve_source_url(cli, toml)?;
        let extractor = Self::resolve_extractor(cli, toml)?;
        let user_agent = Self::resolve_user_agent(toml)?;
        let source_timeout = positive_duration(
            "timeout",
            cli.timeout.or_else(|| toml.and_then(|t| t.source.timeout)),
            defaults::SOURCE_TIMEOUT_SECS,
        )?;

        let check_interval = positive_duration(
            "check_interval",
            cli.check_interval
                .or_else(|| toml.and_then(|t| t.monitor.check_interval)),
            defaults::CHECK_INTERVAL_SECS,
        )?;
        let error_cooldown = positive_duration(
            "error_cooldown",
            cli.error_cooldown
                .or_else(|| toml.and_then(|t| t.monitor.error_cooldown)),
            defaults::ERROR_COOLDOWN_SECS,
        )?;
        let threshold = Self::resolve_threshold(cli, toml)?;

        let backoff = Self::build_backoff_policy(toml)?;
        let template = Self::resolve_template(toml)?;

        Ok(Self {
            token,
            poll_timeout,
            source_url,
            extractor,
            user_agent,
            source_timeout,
            check_interval,
            error_cooldown,
            threshold,
            backoff,
            template,
            verbose: cli.verbose,
        })
    }

    /// Reads the file named by `--config`, if any, then runs
    /// [`from_raw`](Self::from_raw).
    ///
    /// # Errors
    ///
    /// File access and parse errors, then anything `from_raw` rejects.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = cli.config.as_deref().map(TomlConfig::load).transpose()?;
        Self::from_raw(cli, file.as_ref())
    }

    /// The subset [`crate::monitor::RateMonitor`] needs.
    #[must_use]
    pub const fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            check_interval: self.check_interval,
            error_cooldown: self.error_cooldown,
            threshold: self.threshold,
        }
    }

    /// Request timeout for Bot API calls. Longer than the long-poll wait so a
    /// quiet `getUpdates` ends with an empty list instead of a timeout.
    #[must_use]
    pub const fn telegram_timeout(&self) -> Duration {
        self.poll_timeout
            .saturating_add(Duration::from_secs(defaults::TELEGRAM_TIMEOUT_GRACE_SECS))
    }

    fn resolve_token(cli: &Cli, toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        let token = cli
            .token
            .as_deref()
            .or_else(|| toml.and_then(|t| t.telegram.token.as_deref()))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ConfigError::missing(
                    field::TOKEN,
                    "Use --token, TELEGRAM_BOT_TOKEN or set telegram.token in config file",
                )
            })?;

        if token.contains('/') || token.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidToken {
                reason: "must not contain '/' or whitespace",
            });
        }

        Ok(token.to_string())
    }

    fn resolve_source_url(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Url, ConfigError> {
        let raw = cli
            .source_url
            .as_deref()
            .or_else(|| toml.and_then(|t| t.source.url.as_deref()))
            .ok_or_else(|| {
                ConfigError::missing(
                    field::SOURCE_URL,
                    "Use --source-url or set source.url in config file",
                )
            })?;
        let invalid = |reason: String| ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason,
        };

        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(invalid("scheme must be http or https".to_string())),
        }
    }

    fn resolve_extractor(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<RateExtractor, ConfigError> {
        let pattern = cli
            .pattern
            .as_deref()
            .or_else(|| toml.and_then(|t| t.source.pattern.as_deref()))
            .unwrap_or(DEFAULT_PATTERN);

        let extractor = RateExtractor::new(pattern).map_err(|e| ConfigError::InvalidRegex {
            pattern: pattern.to_string(),
            source: e,
        })?;

        if !extractor.has_capture_group() {
            return Err(ConfigError::MissingCaptureGroup {
                pattern: pattern.to_string(),
            });
        }

        Ok(extractor)
    }

    fn resolve_user_agent(toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        let user_agent = toml
            .and_then(|t| t.source.user_agent.as_deref())
            .unwrap_or(DEFAULT_USER_AGENT);

        HeaderValue::from_str(user_agent).map_err(|e| ConfigError::InvalidUserAgent {
            value: user_agent.to_string(),
            reason: e.to_string(),
        })?;

        Ok(user_agent.to_string())
    }

    fn resolve_threshold(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<RateThreshold, ConfigError> {
        let value = cli
            .threshold
            .or_else(|| toml.and_then(|t| t.monitor.threshold))
            .unwrap_or(defaults::THRESHOLD);

        RateThreshold::new(value).ok_or(ConfigError::InvalidThreshold { value })
    }

    fn build_backoff_policy(toml: Option<&TomlConfig>) -> Result<BackoffPolicy, ConfigError> {
        let section = toml.map(|t| &t.backoff);
        let initial = section
            .and_then(|b| b.initial_delay)
            .unwrap_or(defaults::BACKOFF_INITIAL_DELAY_SECS);
        let max = section
            .and_then(|b| b.max_delay)
            .unwrap_or(defaults::BACKOFF_MAX_DELAY_SECS);
        let multiplier = section
            .and_then(|b| b.multiplier)
            .unwrap_or(defaults::BACKOFF_MULTIPLIER);

        let problem = if initial == 0 {
            Some("initial_delay must be greater than 0".to_string())
        } else if !(multiplier.is_finite() && multiplier > 0.0) {
            Some("multiplier must be a positive finite number".to_string())
        } else if max < initial {
            Some(format!(
                "max_delay ({max}s) must be >= initial_delay ({initial}s)"
            ))
        } else {
            None
        };
        if let Some(problem) = problem {
            return Err(ConfigError::InvalidBackoff(problem));
        }

        Ok(BackoffPolicy::new()
            .with_initial_delay(Duration::from_secs(initial))
            .with_max_delay(Duration::from_secs(max))
            .with_multiplier(multiplier))
    }

    fn resolve_template(toml: Option<&TomlConfig>) -> Result<NotificationTemplate, ConfigError> {
        let Some(template) = toml.and_then(|t| t.messages.notification_template.as_deref()) else {
            return Ok(NotificationTemplate::Default);
        };

        // Missing variables render as empty, so only syntax errors surface here.
        Handlebars::new()
            .render_template(template, &serde_json::json!({}))
            .map_err(|e| ConfigError::InvalidTemplate {
                reason: e.to_string(),
            })?;

        Ok(NotificationTemplate::custom(template))
    }
}

/// Backs `rate-watch init`. Overwrites whatever is at `path`.
///
/// # Errors
///
/// [`ConfigError::FileWrite`] when the file cannot be created.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, default_config_template()).map_err(|source| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn positive_duration(
    field: &'static str,
    seconds: Option<u64>,
    default_secs: u64,
) -> Result<Duration, ConfigError> {
    match seconds.unwrap_or(default_secs) {
        0 => Err(ConfigError::InvalidDuration {
            field,
            reason: "must be greater than 0".to_string(),
        }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

/// Keeps the bot id prefix of a token and hides the secret part.
fn mask_token(token: &str) -> String {
    match token.split_once(':') {
        Some((bot_id, _)) => format!("{bot_id}:***"),
        None => "***".to_string(),
    }
}
