use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Watches an exchange rate published on a web page and messages subscribed
/// Telegram chats whenever it moves by at least the threshold.
#[derive(Debug, Parser)]
#[command(name = "rate-watch", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Bot token issued by @BotFather
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Page that publishes the rate
    #[arg(long = "source-url", value_name = "URL")]
    pub source_url: Option<String>,

    /// Regex whose first capture group holds the rate
    #[arg(long, value_name = "REGEX")]
    pub pattern: Option<String>,

    /// Smallest absolute change worth a notification
    #[arg(long, allow_negative_numbers = true)]
    pub threshold: Option<f64>,

    /// Seconds between two rate checks
    #[arg(long = "check-interval", value_name = "SECS")]
    pub check_interval: Option<u64>,

    /// Seconds to pause after an unexpected monitor fault
    #[arg(long = "error-cooldown", value_name = "SECS")]
    pub error_cooldown: Option<u64>,

    /// Seconds before a rate page request is abandoned
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// TOML file with further settings
    #[arg(long, short, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a commented configuration template and exit
    Init {
        /// Where to write the template
        #[arg(long, short, default_value = "rate-watch.toml")]
        output: PathBuf,
    },
}

impl Cli {
    /// Reads `std::env::args`, exiting with usage on error.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Same as [`parse_args`](Self::parse_args) over an explicit argument list.
    pub fn parse_from_iter<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::parse_from(args)
    }

    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}
