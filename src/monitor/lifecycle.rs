//! Run/stop lifecycle of the monitor task.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Notify;
use tokio::task::{JoinError, JoinHandle};

/// Lifecycle state of a [`super::RateMonitor`].
///
/// Transitions only move forward: `Idle → Running → Stopping → Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Constructed, not started.
    Idle,
    /// Polling on its cadence.
    Running,
    /// Stop requested; the in-flight cycle is finishing.
    Stopping,
    /// The task has exited.
    Stopped,
}

/// State shared between the monitor task and its handle.
#[derive(Debug)]
pub(super) struct Lifecycle {
    state: Mutex<MonitorState>,
    stop_requested: Notify,
}

impl Lifecycle {
    pub(super) fn new() -> Self {
        Self {
            state: Mutex::new(MonitorState::Idle),
            stop_requested: Notify::new(),
        }
    }

    pub(super) fn state(&self) -> MonitorState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn set(&self, next: MonitorState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    pub(super) fn is_running(&self) -> bool {
        self.state() == MonitorState::Running
    }

    /// Moves `Running → Stopping` and wakes the task. Returns false if the
    /// monitor was not running.
    pub(super) fn request_stop(&self) -> bool {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state != MonitorState::Running {
                return false;
            }
            *state = MonitorState::Stopping;
        }
        // notify_one keeps a permit if the task is mid-cycle, so the next
        // wait returns immediately.
        self.stop_requested.notify_one();
        true
    }

    pub(super) async fn stopped(&self) {
        self.stop_requested.notified().await;
    }
}

/// Handle to a running monitor task.
///
/// Dropping the handle does not stop the monitor; call
/// [`MonitorHandle::shutdown`] to stop it and wait for the task to exit.
#[derive(Debug)]
pub struct MonitorHandle {
    lifecycle: Arc<Lifecycle>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    pub(super) const fn new(lifecycle: Arc<Lifecycle>, task: JoinHandle<()>) -> Self {
        Self { lifecycle, task }
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> MonitorState {
        self.lifecycle.state()
    }

    /// Requests the monitor to stop after its in-flight cycle.
    ///
    /// Safe to call any number of times from any task.
    pub fn stop(&self) {
        if self.lifecycle.request_stop() {
            tracing::debug!("Rate monitor stop requested");
        }
    }

    /// Returns true once the monitor task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the monitor task to exit.
    ///
    /// Does not request a stop by itself.
    ///
    /// # Errors
    ///
    /// Returns the [`JoinError`] if the task was cancelled or panicked
    /// outside a cycle.
    pub async fn join(self) -> Result<(), JoinError> {
        let result = self.task.await;
        self.lifecycle.set(MonitorState::Stopped);
        result
    }

    /// Stops the monitor and waits for confirmed termination.
    ///
    /// # Errors
    ///
    /// See [`MonitorHandle::join`].
    pub async fn shutdown(self) -> Result<(), JoinError> {
        self.stop();
        self.join().await
    }
}
