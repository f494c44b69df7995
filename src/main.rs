//! rate-watch binary: parses arguments, loads configuration and drives the
//! monitor plus Telegram bot until Ctrl+C or SIGTERM.

use std::path::Path;
use std::process::ExitCode;

use rate_watch::config::{Cli, Command, ValidatedConfig, write_default_config};

mod app;
mod run;

use app::{exit_code, print_config_hint, setup_tracing};

#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    if let Some(Command::Init { output }) = &cli.command {
        return init(output);
    }

    match ValidatedConfig::load(&cli) {
        Ok(config) => {
            setup_tracing(config.verbose);
            tracing::info!("{config}");
            serve(config)
        }
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            exit_code::CONFIG_ERROR
        }
    }
}

fn init(output: &Path) -> ExitCode {
    if let Err(e) = write_default_config(output) {
        eprintln!("Error: {e}");
        return exit_code::CONFIG_ERROR;
    }
    println!("Configuration template written to: {}", output.display());
    exit_code::SUCCESS
}

#[cfg(not(tarpaulin_include))]
fn serve(config: ValidatedConfig) -> ExitCode {
    let runtime = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");

    runtime
        .block_on(run::execute(config))
        .map_or_else(
            |e| {
                tracing::error!("Application error: {e}");
                exit_code::runtime_error()
            },
            |()| exit_code::SUCCESS,
        )
}
