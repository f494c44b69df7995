//! Command semantics.

use std::sync::Arc;

use super::{CommandKind, replies};
use crate::monitor::RateThreshold;
use crate::rate::RateSource;
use crate::subscribers::{SubscriberId, SubscriberRegistry};

/// Executes commands against the shared registry and the rate source.
///
/// Handlers never touch the monitor: `/current` performs its own fetch.
#[derive(Debug)]
pub struct CommandHandler<R> {
    registry: Arc<SubscriberRegistry>,
    source: R,
    threshold: RateThreshold,
}

impl<R: RateSource> CommandHandler<R> {
    /// Creates a handler.
    #[must_use]
    pub const fn new(registry: Arc<SubscriberRegistry>, source: R, threshold: RateThreshold) -> Self {
        Self {
            registry,
            source,
            threshold,
        }
    }

    /// Executes `kind` on behalf of `sender` and returns the reply text.
    pub async fn handle(&self, kind: CommandKind, sender: SubscriberId) -> String {
        tracing::debug!("Handling /{} from {sender}", kind.name());

        match kind {
            CommandKind::Start => replies::welcome(self.threshold),
            CommandKind::Help => replies::help(self.threshold),
            CommandKind::Subscribe => {
                if self.registry.add(sender) {
                    tracing::info!(
                        "Subscriber {sender} added ({} total)",
                        self.registry.len()
                    );
                    replies::SUBSCRIBED.to_string()
                } else {
                    replies::ALREADY_SUBSCRIBED.to_string()
                }
            }
            CommandKind::Unsubscribe => {
                if self.registry.remove(sender) {
                    tracing::info!(
                        "Subscriber {sender} removed ({} total)",
                        self.registry.len()
                    );
                    replies::UNSUBSCRIBED.to_string()
                } else {
                    replies::NOT_SUBSCRIBED.to_string()
                }
            }
            CommandKind::Current => match self.source.fetch().await {
                Ok(sample) => replies::current_rate(sample.value),
                Err(e) => {
                    tracing::warn!("Failed to fetch rate for {sender}: {e}");
                    replies::CURRENT_UNAVAILABLE.to_string()
                }
            },
            CommandKind::Status => {
                replies::status(self.registry.contains(sender), self.registry.len())
            }
        }
    }
}
