//! Process-level helpers for `main`: exit statuses, logging and friendly
//! hints printed after a configuration error.

use rate_watch::config::{ConfigError, field};
use tracing::Level;
use tracing_subscriber::EnvFilter;

pub mod exit_code {
    use std::process::ExitCode;

    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Status 1: the configuration could not be loaded or validated.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Status 2: startup or the bot itself failed after configuration was
    /// accepted, for example Telegram rejecting the token.
    // `ExitCode::from` is not const.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

const INIT_HINT: &str = "\nRun 'rate-watch init' to generate a configuration template.";

/// Writes a follow-up suggestion to stderr when one exists for `error`.
pub fn print_config_hint(error: &ConfigError) {
    match error {
        ConfigError::MissingRequired { field: missing, .. } => {
            if *missing == field::TOKEN {
                eprintln!("\nCreate a bot with @BotFather to obtain a token.");
            }
            eprintln!("{INIT_HINT}");
        }
        ConfigError::FileRead { .. } => eprintln!("{INIT_HINT}"),
        ConfigError::MissingCaptureGroup { .. } => {
            eprintln!("\nWrap the rate text in parentheses, e.g. 'rate: ([0-9.,]+)'.");
        }
        _ => {}
    }
}

/// Installs the global fmt subscriber. `RUST_LOG` overrides the level picked
/// from `--verbose`.
pub fn setup_tracing(verbose: bool) {
    let default_level = if verbose { Level::DEBUG } else { Level::INFO };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .init();
}
