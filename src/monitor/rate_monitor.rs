//! The rate monitor: fetch, decide, broadcast, wait, repeat.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;

use super::lifecycle::{Lifecycle, MonitorHandle, MonitorState};
use super::{MonitorError, NotificationTemplate, RateThreshold};
use crate::notify::{BroadcastReport, Dispatcher, MessageSender};
use crate::rate::{FetchError, RateSource};
use crate::subscribers::SubscriberRegistry;
use crate::time::{Clock, Sleeper, SystemClock, TokioSleeper};

/// Timing and threshold settings for the monitor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorSettings {
    /// Delay between the end of one cycle and the start of the next.
    pub check_interval: Duration,
    /// Delay after an unexpected fault, used instead of `check_interval`.
    pub error_cooldown: Duration,
    /// Minimum rate move that triggers a notification.
    pub threshold: RateThreshold,
}

/// Result of one monitoring cycle.
#[derive(Debug)]
pub enum CycleOutcome {
    /// The source failed; the last accepted rate is unchanged.
    FetchFailed(FetchError),
    /// The rate did not move enough; nothing was sent.
    Unchanged {
        /// The sampled rate
        rate: f64,
    },
    /// Subscribers were notified and the rate was accepted.
    Notified {
        /// The accepted rate
        rate: f64,
        /// Per-recipient delivery results
        report: BroadcastReport,
    },
}

/// Periodically samples a [`RateSource`] and broadcasts significant moves.
///
/// The monitor owns the last accepted rate; nothing else reads or writes
/// it. Subscribers are read from the shared [`SubscriberRegistry`] as a
/// snapshot at broadcast time.
///
/// # Type Parameters
///
/// - `R`: The rate source
/// - `S`: The message sender used for broadcasts
/// - `C`: The clock for notification timestamps (defaults to [`SystemClock`])
/// - `Sl`: The sleeper for inter-cycle delays (defaults to [`TokioSleeper`])
///
/// # Example
///
/// ```ignore
/// let monitor = RateMonitor::new(source, sender, registry, settings);
/// let handle = monitor.start();
/// // ...
/// handle.shutdown().await?;
/// ```
pub struct RateMonitor<R, S, C = SystemClock, Sl = TokioSleeper> {
    source: R,
    dispatcher: Dispatcher<S>,
    registry: Arc<SubscriberRegistry>,
    template: NotificationTemplate,
    settings: MonitorSettings,
    clock: C,
    sleeper: Sl,
    last_accepted_rate: Option<f64>,
    lifecycle: Arc<Lifecycle>,
}

impl<R, S> RateMonitor<R, S, SystemClock, TokioSleeper>
where
    R: RateSource,
    S: MessageSender,
{
    /// Creates an idle monitor with the system clock and tokio sleeper.
    #[must_use]
    pub fn new(
        source: R,
        sender: S,
        registry: Arc<SubscriberRegistry>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            source,
            dispatcher: Dispatcher::new(sender, Arc::clone(&registry)),
            registry,
            template: NotificationTemplate::default(),
            settings,
            clock: SystemClock,
            sleeper: TokioSleeper,
            last_accepted_rate: None,
            lifecycle: Arc::new(Lifecycle::new()),
        }
    }
}

impl<R, S, C, Sl> RateMonitor<R, S, C, Sl> {
    /// Sets the notification template.
    #[must_use]
    pub fn with_template(mut self, template: NotificationTemplate) -> Self {
        self.template = template;
        self
    }

    /// Replaces the clock used for notification timestamps.
    #[must_use]
    pub fn with_clock<C2>(self, clock: C2) -> RateMonitor<R, S, C2, Sl> {
        RateMonitor {
            source: self.source,
            dispatcher: self.dispatcher,
            registry: self.registry,
            template: self.template,
            settings: self.settings,
            clock,
            sleeper: self.sleeper,
            last_accepted_rate: self.last_accepted_rate,
            lifecycle: self.lifecycle,
        }
    }

    /// Replaces the sleeper used between cycles.
    ///
    /// This is primarily useful for testing to avoid actual delays.
    #[must_use]
    pub fn with_sleeper<Sl2>(self, sleeper: Sl2) -> RateMonitor<R, S, C, Sl2> {
        RateMonitor {
            source: self.source,
            dispatcher: self.dispatcher,
            registry: self.registry,
            template: self.template,
            settings: self.settings,
            clock: self.clock,
            sleeper,
            last_accepted_rate: self.last_accepted_rate,
            lifecycle: self.lifecycle,
        }
    }

    /// Returns the configured settings.
    #[must_use]
    pub const fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Returns the last accepted rate, if any.
    #[must_use]
    pub const fn last_accepted_rate(&self) -> Option<f64> {
        self.last_accepted_rate
    }

    /// Returns the lifecycle state. Always [`MonitorState::Idle`] before
    /// [`RateMonitor::start`].
    #[must_use]
    pub fn state(&self) -> MonitorState {
        self.lifecycle.state()
    }
}

impl<R, S, C, Sl> RateMonitor<R, S, C, Sl>
where
    R: RateSource,
    S: MessageSender,
    C: Clock,
    Sl: Sleeper,
{
    /// Runs a single fetch/decide/broadcast cycle.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::NonFiniteRate`] if the source hands back a
    /// NaN or infinite value. Fetch failures are reported as
    /// [`CycleOutcome::FetchFailed`], not as errors.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, MonitorError> {
        let sample = match self.source.fetch().await {
            Ok(sample) => sample,
            Err(e) => {
                tracing::warn!("Failed to fetch rate: {e}");
                return Ok(CycleOutcome::FetchFailed(e));
            }
        };

        let rate = sample.value;
        if !rate.is_finite() {
            return Err(MonitorError::NonFiniteRate { value: rate });
        }

        if !self
            .settings
            .threshold
            .should_notify(rate, self.last_accepted_rate)
        {
            tracing::debug!("Rate {rate:.2} is within threshold, not notifying");
            return Ok(CycleOutcome::Unchanged { rate });
        }

        let text = self.template.render(rate, self.clock.now());
        let recipients = self.registry.snapshot();
        tracing::info!(
            "Rate changed to {rate:.2}, notifying {} subscriber(s)",
            recipients.len()
        );

        let report = self.dispatcher.broadcast(&recipients, &text).await;
        self.last_accepted_rate = Some(rate);

        Ok(CycleOutcome::Notified { rate, report })
    }

    /// Runs a cycle, converting a panic in any collaborator into
    /// [`MonitorError::CyclePanicked`].
    ///
    /// # Errors
    ///
    /// Returns every error of [`RateMonitor::run_cycle`] plus
    /// [`MonitorError::CyclePanicked`].
    pub async fn run_guarded_cycle(&mut self) -> Result<CycleOutcome, MonitorError> {
        match AssertUnwindSafe(self.run_cycle()).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(MonitorError::from_panic(payload.as_ref())),
        }
    }

    /// Returns how long to wait after a cycle with the given result.
    #[must_use]
    pub fn delay_after(&self, result: &Result<CycleOutcome, MonitorError>) -> Duration {
        match result {
            Ok(_) => self.settings.check_interval,
            Err(_) => self.settings.error_cooldown,
        }
    }
}

impl<R, S, C, Sl> RateMonitor<R, S, C, Sl>
where
    R: RateSource + 'static,
    S: MessageSender + 'static,
    C: Clock + 'static,
    Sl: Sleeper + 'static,
{
    /// Spawns the monitor on the current tokio runtime.
    ///
    /// The first cycle runs immediately.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn start(self) -> MonitorHandle {
        let lifecycle = Arc::clone(&self.lifecycle);
        lifecycle.set(MonitorState::Running);
        let task = tokio::spawn(self.run());
        MonitorHandle::new(lifecycle, task)
    }

    async fn run(mut self) {
        tracing::info!(
            "Rate monitor started (interval: {}s, threshold: {})",
            self.settings.check_interval.as_secs(),
            self.settings.threshold
        );

        while self.lifecycle.is_running() {
            let result = self.run_guarded_cycle().await;
            let delay = self.delay_after(&result);
            if let Err(e) = &result {
                tracing::error!(
                    "Monitoring cycle failed, retrying in {}s: {e}",
                    delay.as_secs()
                );
            }

            if !self.lifecycle.is_running() {
                break;
            }

            tokio::select! {
                biased;

                () = self.lifecycle.stopped() => {}
                () = self.sleeper.sleep(delay) => {}
            }
        }

        self.lifecycle.set(MonitorState::Stopped);
        tracing::info!("Rate monitor stopped");
    }
}
