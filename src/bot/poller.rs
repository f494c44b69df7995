//! Long-polling loop that turns updates into handled commands.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use super::{Command, CommandHandler};
use crate::client::HttpClient;
use crate::rate::RateSource;
use crate::telegram::{BackoffPolicy, TelegramClient, TelegramError, Update};
use crate::time::{Sleeper, TokioSleeper};

/// Receives updates with `getUpdates` and answers each command in its own
/// task.
///
/// Commands run concurrently with each other and with the monitor, so a
/// slow `/current` never delays other replies. Consecutive poll failures are
/// retried after a [`BackoffPolicy`] delay; a successful poll resets it.
///
/// # Type Parameters
///
/// - `H`: The HTTP client behind the Telegram API
/// - `R`: The rate source used by `/current`
/// - `Sl`: The sleeper for backoff delays (defaults to [`TokioSleeper`])
pub struct UpdatePoller<H, R, Sl = TokioSleeper> {
    telegram: Arc<TelegramClient<H>>,
    handler: Arc<CommandHandler<R>>,
    backoff: BackoffPolicy,
    poll_timeout: Duration,
    bot_username: Option<String>,
    sleeper: Sl,
    offset: Option<i64>,
}

impl<H, R> UpdatePoller<H, R, TokioSleeper>
where
    H: HttpClient + 'static,
    R: RateSource + 'static,
{
    /// Creates a poller with the tokio sleeper.
    #[must_use]
    pub fn new(
        telegram: Arc<TelegramClient<H>>,
        handler: Arc<CommandHandler<R>>,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            telegram,
            handler,
            backoff: BackoffPolicy::default(),
            poll_timeout,
            bot_username: None,
            sleeper: TokioSleeper,
            offset: None,
        }
    }
}

impl<H, R, Sl> UpdatePoller<H, R, Sl>
where
    H: HttpClient + 'static,
    R: RateSource + 'static,
    Sl: Sleeper,
{
    /// Sets the backoff policy for failed polls.
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets the bot's username so commands addressed to other bots are
    /// ignored in group chats.
    #[must_use]
    pub fn with_bot_username(mut self, username: Option<String>) -> Self {
        self.bot_username = username;
        self
    }

    /// Replaces the sleeper used for backoff delays.
    #[must_use]
    pub fn with_sleeper<Sl2: Sleeper>(self, sleeper: Sl2) -> UpdatePoller<H, R, Sl2> {
        UpdatePoller {
            telegram: self.telegram,
            handler: self.handler,
            backoff: self.backoff,
            poll_timeout: self.poll_timeout,
            bot_username: self.bot_username,
            sleeper,
            offset: self.offset,
        }
    }

    /// Polls until `shutdown` completes, then waits for in-flight commands.
    ///
    /// A poll in progress when `shutdown` fires is abandoned; its updates
    /// were not confirmed and will be delivered again on the next start.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut tasks = JoinSet::new();
        let mut failures: u32 = 0;

        tracing::info!("Listening for commands");

        loop {
            reap_finished(&mut tasks);

            let polled = tokio::select! {
                biased;

                () = &mut shutdown => break,
                result = self.poll() => result,
            };

            match polled {
                Ok(updates) => {
                    failures = 0;
                    for update in updates {
                        self.dispatch(update, &mut tasks);
                    }
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    let delay = self.backoff.delay_for_failure(failures);
                    tracing::warn!(
                        "Failed to poll updates (attempt {failures}), retrying in {:.1}s: {e}",
                        delay.as_secs_f64()
                    );

                    tokio::select! {
                        biased;

                        () = &mut shutdown => break,
                        () = self.sleeper.sleep(delay) => {}
                    }
                }
            }
        }

        tracing::info!("Stopped listening for commands");
        while let Some(result) = tasks.join_next().await {
            log_task_result(result);
        }
    }

    async fn poll(&self) -> Result<Vec<Update>, TelegramError> {
        self.telegram
            .get_updates(self.offset, self.poll_timeout)
            .await
    }

    fn dispatch(&mut self, update: Update, tasks: &mut JoinSet<()>) {
        let next = update.update_id + 1;
        self.offset = Some(self.offset.map_or(next, |offset| offset.max(next)));

        let Some(message) = update.message else {
            return;
        };
        let Some(command) = Command::from_message(&message, self.bot_username.as_deref())
        else {
            return;
        };

        let telegram = Arc::clone(&self.telegram);
        let handler = Arc::clone(&self.handler);
        tasks.spawn(async move {
            let reply = handler.handle(command.kind, command.chat).await;
            if let Err(e) = telegram
                .send_message(command.chat.0, &reply, Some(command.message_id))
                .await
            {
                tracing::warn!(
                    "Failed to reply to /{} from {}: {e}",
                    command.kind.name(),
                    command.chat
                );
            }
        });
    }
}

fn reap_finished(tasks: &mut JoinSet<()>) {
    while let Some(result) = tasks.try_join_next() {
        log_task_result(result);
    }
}

fn log_task_result(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        tracing::error!("Command handler task failed: {e}");
    }
}
