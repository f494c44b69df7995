//! Broadcast delivery with pruning of permanently failed recipients.

use std::sync::Arc;

use futures_util::{StreamExt, stream};

use super::{DeliveryError, MessageSender};
use crate::subscribers::{SubscriberId, SubscriberRegistry};

/// Upper bound on sends in flight during one broadcast.
///
/// Telegram throttles bots at roughly 30 messages per second and answers
/// with 429 beyond that.
pub const MAX_CONCURRENT_SENDS: usize = 8;

/// Outcome of one broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Number of recipients the message reached.
    pub delivered: usize,
    /// Recipients removed from the registry after a permanent failure.
    pub pruned: Vec<SubscriberId>,
    /// Recipients that failed transiently and were kept.
    pub failed: Vec<SubscriberId>,
}

impl BroadcastReport {
    /// Total number of recipients attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.delivered + self.pruned.len() + self.failed.len()
    }
}

/// Delivers a message to every recipient of a snapshot.
///
/// Up to [`MAX_CONCURRENT_SENDS`] deliveries run at once. They are
/// independent: a failure for one
/// recipient neither aborts nor delays the others, and nothing is retried
/// within a broadcast. Permanently failed recipients are removed from the
/// registry before [`Dispatcher::broadcast`] returns.
#[derive(Debug)]
pub struct Dispatcher<S> {
    sender: S,
    registry: Arc<SubscriberRegistry>,
}

impl<S: MessageSender> Dispatcher<S> {
    /// Creates a dispatcher that prunes from `registry`.
    #[must_use]
    pub const fn new(sender: S, registry: Arc<SubscriberRegistry>) -> Self {
        Self { sender, registry }
    }

    /// Returns the underlying sender.
    #[must_use]
    pub const fn sender(&self) -> &S {
        &self.sender
    }

    /// Sends `message` to every recipient.
    pub async fn broadcast(&self, recipients: &[SubscriberId], message: &str) -> BroadcastReport {
        let mut attempts = stream::iter(recipients.iter().copied())
            .map(|recipient| self.deliver(recipient, message))
            .buffer_unordered(MAX_CONCURRENT_SENDS);

        let mut report = BroadcastReport::default();
        while let Some((recipient, result)) = attempts.next().await {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => self.record_failure(&mut report, recipient, &e),
            }
        }

        tracing::debug!(
            "Broadcast finished: {} delivered, {} pruned, {} failed",
            report.delivered,
            report.pruned.len(),
            report.failed.len()
        );
        report
    }

    async fn deliver(
        &self,
        recipient: SubscriberId,
        message: &str,
    ) -> (SubscriberId, Result<(), DeliveryError>) {
        (recipient, self.sender.send(recipient, message).await)
    }

    fn record_failure(
        &self,
        report: &mut BroadcastReport,
        recipient: SubscriberId,
        error: &DeliveryError,
    ) {
        if error.is_permanent() {
            if self.registry.remove(recipient) {
                tracing::info!("Removed subscriber {recipient}: {error}");
            }
            report.pruned.push(recipient);
        } else {
            tracing::warn!("Failed to notify subscriber {recipient}: {error}");
            report.failed.push(recipient);
        }
    }
}
