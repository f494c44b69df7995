//! Injectable time sources.
//!
//! Rate samples and notifications carry wall-clock timestamps, and both long
//! running loops pause between iterations. Routing those through [`Clock`]
//! and [`Sleeper`] lets tests pin timestamps and record requested delays.

use std::future::Future;
use std::time::{Duration, SystemTime};

/// Source of wall-clock timestamps.
///
/// ```
/// use rate_watch::time::{Clock, SystemClock};
///
/// assert!(SystemClock.now() > std::time::SystemTime::UNIX_EPOCH);
/// ```
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// Reads [`SystemTime::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Asynchronous pause between loop iterations.
///
/// The rate monitor waits through it between checks, and the update poller
/// waits through it while backing off after a failed long poll.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Delegates to [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
