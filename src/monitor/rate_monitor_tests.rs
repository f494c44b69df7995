//! Tests for `RateMonitor` cycles and lifecycle.

use super::*;
use crate::notify::{DeliveryError, MessageSender};
use crate::rate::{FetchError, RateSample, RateSource};
use crate::subscribers::{SubscriberId, SubscriberRegistry};
use crate::time::{Clock, Sleeper};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

const X: SubscriberId = SubscriberId(10);
const Y: SubscriberId = SubscriberId(20);

const CHECK_INTERVAL: Duration = Duration::from_secs(300);
const ERROR_COOLDOWN: Duration = Duration::from_secs(60);

/// One scripted response of the mock source.
enum Step {
    Rate(f64),
    Fail,
    Panic,
}

/// Mock source that replays a script, then fails forever.
#[derive(Default)]
struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn rates(rates: &[f64]) -> Self {
        Self::new(rates.iter().copied().map(Step::Rate).collect())
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RateSource for ScriptedSource {
    async fn fetch(&self) -> Result<RateSample, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Rate(value)) => Ok(RateSample::new(value, SystemTime::UNIX_EPOCH)),
            Some(Step::Panic) => panic!("scraper exploded"),
            Some(Step::Fail) | None => Err(FetchError::NotFound),
        }
    }
}

/// Mock sender that records deliveries and fails for blocked recipients.
#[derive(Default)]
struct RecordingSender {
    blocked: HashSet<SubscriberId>,
    sent: Mutex<Vec<(SubscriberId, String)>>,
}

impl RecordingSender {
    fn blocking(ids: &[SubscriberId]) -> Self {
        Self {
            blocked: ids.iter().copied().collect(),
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent(&self) -> Vec<(SubscriberId, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl MessageSender for RecordingSender {
    async fn send(&self, recipient: SubscriberId, text: &str) -> Result<(), DeliveryError> {
        if self.blocked.contains(&recipient) {
            return Err(DeliveryError::permanent("Forbidden: bot was blocked by the user"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient, text.to_string()));
        Ok(())
    }
}

/// Sleeper that records requested delays and only yields.
#[derive(Default)]
struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Sleeper for Arc<RecordingSleeper> {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }
}

struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }
}

fn settings(threshold: f64) -> MonitorSettings {
    MonitorSettings {
        check_interval: CHECK_INTERVAL,
        error_cooldown: ERROR_COOLDOWN,
        threshold: RateThreshold::new(threshold).unwrap(),
    }
}

fn registry_with(ids: &[SubscriberId]) -> Arc<SubscriberRegistry> {
    let registry = Arc::new(SubscriberRegistry::new());
    for id in ids {
        registry.add(*id);
    }
    registry
}

fn monitor(
    source: ScriptedSource,
    sender: RecordingSender,
    registry: Arc<SubscriberRegistry>,
    threshold: f64,
) -> RateMonitor<Arc<ScriptedSource>, Arc<RecordingSender>, FixedClock> {
    RateMonitor::new(
        Arc::new(source),
        Arc::new(sender),
        registry,
        settings(threshold),
    )
    .with_clock(FixedClock)
}

/// Runs cycles until the source has produced `n` results.
async fn run_cycles<R, S, C, Sl>(
    monitor: &mut RateMonitor<R, S, C, Sl>,
    n: usize,
) -> Vec<CycleOutcome>
where
    R: RateSource,
    S: MessageSender,
    C: Clock,
    Sl: Sleeper,
{
    let mut outcomes = Vec::with_capacity(n);
    for _ in 0..n {
        outcomes.push(monitor.run_cycle().await.unwrap());
    }
    outcomes
}

mod cycles {
    use super::*;

    #[tokio::test]
    async fn first_sample_notifies_and_is_accepted() {
        let sender = Arc::new(RecordingSender::default());
        let mut monitor = RateMonitor::new(
            Arc::new(ScriptedSource::rates(&[27.10])),
            Arc::clone(&sender),
            registry_with(&[X]),
            settings(0.5),
        )
        .with_clock(FixedClock);

        let outcome = monitor.run_cycle().await.unwrap();

        assert!(matches!(
            outcome,
            CycleOutcome::Notified { rate, .. } if (rate - 27.10).abs() < 1e-9
        ));
        assert_eq!(monitor.last_accepted_rate(), Some(27.10));
        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains("27.10"));
    }

    #[tokio::test]
    async fn small_move_is_ignored() {
        let mut monitor = monitor(
            ScriptedSource::rates(&[27.10, 27.30]),
            RecordingSender::default(),
            registry_with(&[X]),
            0.5,
        );

        let outcomes = run_cycles(&mut monitor, 2).await;

        assert!(matches!(outcomes[1], CycleOutcome::Unchanged { .. }));
        assert_eq!(monitor.last_accepted_rate(), Some(27.10));
    }

    #[tokio::test]
    async fn large_move_notifies_with_new_rate() {
        let sender = Arc::new(RecordingSender::default());
        let mut monitor = RateMonitor::new(
            Arc::new(ScriptedSource::rates(&[27.10, 27.70])),
            Arc::clone(&sender),
            registry_with(&[X]),
            settings(0.5),
        );

        let outcomes = run_cycles(&mut monitor, 2).await;

        assert!(matches!(outcomes[1], CycleOutcome::Notified { .. }));
        assert_eq!(monitor.last_accepted_rate(), Some(27.70));
        let sent = sender.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[1].1.contains("27.70"));
    }

    #[tokio::test]
    async fn small_moves_accumulate_against_last_accepted_rate() {
        let mut monitor = monitor(
            ScriptedSource::rates(&[27.10, 27.40, 27.65]),
            RecordingSender::default(),
            registry_with(&[X]),
            0.5,
        );

        let outcomes = run_cycles(&mut monitor, 3).await;

        assert!(matches!(outcomes[1], CycleOutcome::Unchanged { .. }));
        assert!(matches!(outcomes[2], CycleOutcome::Notified { .. }));
        assert_eq!(monitor.last_accepted_rate(), Some(27.65));
    }

    #[tokio::test]
    async fn fetch_failures_leave_state_untouched() {
        let sender = Arc::new(RecordingSender::default());
        let source = Arc::new(ScriptedSource::new(vec![
            Step::Rate(27.10),
            Step::Fail,
            Step::Fail,
            Step::Fail,
            Step::Rate(28.00),
        ]));
        let mut monitor = RateMonitor::new(
            Arc::clone(&source),
            Arc::clone(&sender),
            registry_with(&[X]),
            settings(0.5),
        );

        let outcomes = run_cycles(&mut monitor, 4).await;

        assert!(
            outcomes[1..]
                .iter()
                .all(|o| matches!(o, CycleOutcome::FetchFailed(_)))
        );
        assert_eq!(monitor.last_accepted_rate(), Some(27.10));
        assert_eq!(sender.sent().len(), 1);

        // The monitor keeps working after the failures.
        let outcome = monitor.run_cycle().await.unwrap();
        assert!(matches!(outcome, CycleOutcome::Notified { .. }));
        assert_eq!(source.calls(), 5);
    }

    #[tokio::test]
    async fn fetch_failure_before_first_sample_keeps_rate_unknown() {
        let mut monitor = monitor(
            ScriptedSource::new(vec![Step::Fail, Step::Fail, Step::Fail]),
            RecordingSender::default(),
            registry_with(&[X]),
            0.5,
        );

        run_cycles(&mut monitor, 3).await;

        assert_eq!(monitor.last_accepted_rate(), None);
    }

    #[tokio::test]
    async fn rate_is_accepted_even_without_subscribers() {
        let mut monitor = monitor(
            ScriptedSource::rates(&[27.10, 27.30]),
            RecordingSender::default(),
            registry_with(&[]),
            0.5,
        );

        let outcomes = run_cycles(&mut monitor, 2).await;

        match &outcomes[0] {
            CycleOutcome::Notified { report, .. } => assert_eq!(report.attempted(), 0),
            other => panic!("expected notification, got {other:?}"),
        }
        assert!(matches!(outcomes[1], CycleOutcome::Unchanged { .. }));
        assert_eq!(monitor.last_accepted_rate(), Some(27.10));
    }

    #[tokio::test]
    async fn zero_threshold_notifies_on_repeated_value() {
        let mut monitor = monitor(
            ScriptedSource::rates(&[27.10, 27.10]),
            RecordingSender::default(),
            registry_with(&[X]),
            0.0,
        );

        let outcomes = run_cycles(&mut monitor, 2).await;

        assert!(
            outcomes
                .iter()
                .all(|o| matches!(o, CycleOutcome::Notified { .. }))
        );
    }

    #[tokio::test]
    async fn blocked_subscriber_is_pruned_during_broadcast() {
        let registry = registry_with(&[X, Y]);
        let sender = Arc::new(RecordingSender::blocking(&[X]));
        let mut monitor = RateMonitor::new(
            Arc::new(ScriptedSource::rates(&[27.10])),
            Arc::clone(&sender),
            Arc::clone(&registry),
            settings(0.5),
        );

        let outcome = monitor.run_cycle().await.unwrap();

        match outcome {
            CycleOutcome::Notified { report, .. } => {
                assert_eq!(report.pruned, vec![X]);
                assert_eq!(report.delivered, 1);
            }
            other => panic!("expected notification, got {other:?}"),
        }
        assert_eq!(registry.snapshot(), vec![Y]);
        assert_eq!(sender.sent()[0].0, Y);
    }

    #[tokio::test]
    async fn notification_uses_custom_template_and_clock() {
        let sender = Arc::new(RecordingSender::default());
        let mut monitor = RateMonitor::new(
            Arc::new(ScriptedSource::rates(&[27.7])),
            Arc::clone(&sender),
            registry_with(&[X]),
            settings(0.5),
        )
        .with_clock(FixedClock)
        .with_template(NotificationTemplate::custom("{{rate}} at {{timestamp}}"));

        monitor.run_cycle().await.unwrap();

        let expected = format!(
            "27.70 at {}",
            format_timestamp(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000))
        );
        assert_eq!(sender.sent()[0].1, expected);
    }
}

mod unexpected_faults {
    use super::*;

    #[tokio::test]
    async fn non_finite_rate_is_an_error() {
        let mut monitor = monitor(
            ScriptedSource::rates(&[f64::NAN]),
            RecordingSender::default(),
            registry_with(&[X]),
            0.5,
        );

        let result = monitor.run_cycle().await;

        assert!(matches!(result, Err(MonitorError::NonFiniteRate { .. })));
        assert_eq!(monitor.last_accepted_rate(), None);
    }

    #[tokio::test]
    async fn panic_in_source_is_caught() {
        let mut monitor = monitor(
            ScriptedSource::new(vec![Step::Panic, Step::Rate(27.10)]),
            RecordingSender::default(),
            registry_with(&[X]),
            0.5,
        );

        let result = monitor.run_guarded_cycle().await;
        match &result {
            Err(MonitorError::CyclePanicked { message }) => {
                assert_eq!(message, "scraper exploded");
            }
            other => panic!("expected caught panic, got {other:?}"),
        }

        // The monitor survives and keeps working.
        let next = monitor.run_guarded_cycle().await.unwrap();
        assert!(matches!(next, CycleOutcome::Notified { .. }));
    }

    #[tokio::test]
    async fn errors_use_longer_cooldown() {
        let monitor = monitor(
            ScriptedSource::default(),
            RecordingSender::default(),
            registry_with(&[]),
            0.5,
        );

        let failed_fetch = Ok(CycleOutcome::FetchFailed(FetchError::NotFound));
        let fault = Err(MonitorError::NonFiniteRate { value: f64::NAN });

        assert_eq!(monitor.delay_after(&failed_fetch), CHECK_INTERVAL);
        assert_eq!(monitor.delay_after(&fault), ERROR_COOLDOWN);
    }
}

mod run_stop {
    use super::*;

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        while !condition() {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn new_monitor_is_idle() {
        let monitor = monitor(
            ScriptedSource::default(),
            RecordingSender::default(),
            registry_with(&[]),
            0.5,
        );

        assert_eq!(monitor.state(), MonitorState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn start_runs_first_cycle_immediately_and_shutdown_stops() {
        let source = Arc::new(ScriptedSource::rates(&[27.10]));
        let sender = Arc::new(RecordingSender::default());
        let monitor = RateMonitor::new(
            Arc::clone(&source),
            Arc::clone(&sender),
            registry_with(&[X]),
            settings(0.5),
        );

        let handle = monitor.start();
        assert_eq!(handle.state(), MonitorState::Running);

        wait_until(|| source.calls() == 1).await;
        wait_until(|| !sender.sent().is_empty()).await;

        handle.shutdown().await.unwrap();

        // The inter-cycle delay was interrupted; no second fetch happened.
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_join_confirms_termination() {
        let source = Arc::new(ScriptedSource::default());
        let monitor = RateMonitor::new(
            Arc::clone(&source),
            Arc::new(RecordingSender::default()),
            registry_with(&[]),
            settings(0.5),
        );

        let handle = monitor.start();
        wait_until(|| source.calls() >= 1).await;

        handle.stop();
        handle.stop();
        assert!(matches!(
            handle.state(),
            MonitorState::Stopping | MonitorState::Stopped
        ));

        let lifecycle_check = tokio::time::timeout(Duration::from_secs(1), handle.join()).await;
        assert!(lifecycle_check.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn cadence_waits_interval_between_cycles() {
        let source = Arc::new(ScriptedSource::rates(&[27.10, 27.20, 27.30]));
        let monitor = RateMonitor::new(
            Arc::clone(&source),
            Arc::new(RecordingSender::default()),
            registry_with(&[]),
            settings(0.5),
        );

        let start = tokio::time::Instant::now();
        let handle = monitor.start();
        wait_until(|| source.calls() == 1).await;

        tokio::time::sleep(CHECK_INTERVAL + Duration::from_secs(1)).await;
        assert_eq!(source.calls(), 2);

        tokio::time::sleep(CHECK_INTERVAL).await;
        assert_eq!(source.calls(), 3);
        assert!(start.elapsed() >= CHECK_INTERVAL * 2);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn loop_survives_faults_and_chooses_delays() {
        let source = Arc::new(ScriptedSource::new(vec![
            Step::Fail,
            Step::Panic,
            Step::Rate(27.10),
        ]));
        let sleeper = Arc::new(RecordingSleeper::default());
        let monitor = RateMonitor::new(
            Arc::clone(&source),
            Arc::new(RecordingSender::default()),
            registry_with(&[]),
            settings(0.5),
        )
        .with_sleeper(Arc::clone(&sleeper));

        let handle = monitor.start();
        wait_until(|| sleeper.delays().len() >= 3).await;
        handle.shutdown().await.unwrap();

        assert_eq!(
            sleeper.delays()[..3],
            [CHECK_INTERVAL, ERROR_COOLDOWN, CHECK_INTERVAL]
        );
    }
}
