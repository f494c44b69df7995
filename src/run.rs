//! Startup wiring and the process lifetime of the bot.

use std::sync::Arc;

use thiserror::Error;
use tokio::signal;
use tokio::task::JoinError;

use rate_watch::bot::{CommandHandler, UpdatePoller};
use rate_watch::client::{HttpError, ReqwestClient};
use rate_watch::config::ValidatedConfig;
use rate_watch::monitor::RateMonitor;
use rate_watch::rate::HttpRateSource;
use rate_watch::subscribers::SubscriberRegistry;
use rate_watch::telegram::{TelegramClient, TelegramError};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Failures after configuration was accepted. All map to exit status 2.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[source] HttpError),

    /// `getMe` failed, so the token is wrong or Telegram is unreachable.
    #[error("Telegram startup failed: {0}")]
    Telegram(#[source] TelegramError),

    /// The monitor task panicked outside a guarded cycle or was cancelled.
    #[error("Rate monitor task failed: {0}")]
    MonitorJoin(#[source] JoinError),
}

/// Runs the monitor in the background and answers commands in the
/// foreground until Ctrl+C or SIGTERM, then stops the monitor and waits for
/// its current cycle.
///
/// The token is checked with `getMe` before anything starts, which also
/// yields the username used to filter `/command@otherbot` messages.
///
/// # Errors
///
/// See [`RunError`].
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let registry = Arc::new(SubscriberRegistry::new());
    let source = Arc::new(create_rate_source(&config)?);
    let telegram = Arc::new(create_telegram(&config)?);

    let me = telegram.get_me().await.map_err(RunError::Telegram)?;
    match me.username.as_deref() {
        Some(username) => tracing::info!("Authorized as @{username}"),
        None => tracing::info!("Authorized as bot {}", me.id),
    }

    let handle = RateMonitor::new(
        Arc::clone(&source),
        Arc::clone(&telegram),
        Arc::clone(&registry),
        config.monitor_settings(),
    )
    .with_template(config.template.clone())
    .start();

    let handler = Arc::new(CommandHandler::new(registry, source, config.threshold));
    let poller = UpdatePoller::new(telegram, handler, config.poll_timeout)
        .with_backoff(config.backoff.clone())
        .with_bot_username(me.username);

    poller
        .run(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, stopping...");
        })
        .await;

    handle.shutdown().await.map_err(RunError::MonitorJoin)?;
    tracing::info!("Bot stopped");

    Ok(())
}

/// Scraper with its own client, so a slow rate page never shares a timeout
/// with the long poll.
fn create_rate_source(
    config: &ValidatedConfig,
) -> Result<HttpRateSource<ReqwestClient>, RunError> {
    let client = ReqwestClient::with_timeout(config.source_timeout).map_err(RunError::HttpClient)?;

    Ok(HttpRateSource::new(client, config.source_url.clone())
        .with_extractor(config.extractor.clone())
        .with_user_agent(config.user_agent.clone()))
}

fn create_telegram(config: &ValidatedConfig) -> Result<TelegramClient<ReqwestClient>, RunError> {
    let client =
        ReqwestClient::with_timeout(config.telegram_timeout()).map_err(RunError::HttpClient)?;

    TelegramClient::new(client, &config.token).map_err(RunError::Telegram)
}

/// Resolves on the first Ctrl+C, or SIGTERM on Unix.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let interrupt = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        let mut stream = signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler");
        stream.recv().await;
    };
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {}
        () = sigterm => {}
    }
}
