//! Tests for validated configuration.

use std::time::Duration;

use super::ConfigError;
use super::cli::Cli;
use super::toml::TomlConfig;
use super::validated::ValidatedConfig;

const TOKEN: &str = "123456:secret-part";
const SOURCE: &str = "https://example.com/rates";

/// Helper to create CLI args from a slice
fn cli(args: &[&str]) -> Cli {
    let mut full_args = vec!["rate-watch"];
    full_args.extend(args);
    Cli::parse_from_iter(full_args)
}

/// Helper to create CLI args with both required fields plus `args`
fn cli_with_required(args: &[&str]) -> Cli {
    let mut full_args = vec!["--token", TOKEN, "--source-url", SOURCE];
    full_args.extend(args);
    cli(&full_args)
}

/// Helper to parse TOML config
fn toml(content: &str) -> TomlConfig {
    TomlConfig::parse(content).unwrap()
}
