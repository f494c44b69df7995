//! Settings for rate-watch, gathered from three layers.
//!
//! A value given on the command line wins over the same key in the TOML file
//! passed with `--config`, which wins over the constants in [`defaults`]. The
//! bot token can also arrive through `TELEGRAM_BOT_TOKEN`. Only the token and
//! the rate page URL have no default.
//!
//! A handful of knobs exist in the file alone: `telegram.poll_timeout`,
//! `source.user_agent`, the `[backoff]` table and
//! `messages.notification_template`.
//!
//! [`ValidatedConfig::load`] does the merge and rejects anything unusable, so
//! the rest of the crate only ever sees checked values. `rate-watch init`
//! writes [`default_config_template`] to disk as a starting point.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod validated_tests;

pub use cli::{Cli, Command};
pub use error::{ConfigError, field};
pub use toml::{TomlConfig, default_config_template};
pub use validated::{ValidatedConfig, write_default_config};
