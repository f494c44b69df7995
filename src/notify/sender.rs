//! Transport send boundary.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

use crate::subscribers::SubscriberId;

/// Failure to deliver a message to one recipient.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The recipient can never receive messages again (blocked the bot,
    /// deleted the account, left the chat). The recipient should be pruned.
    #[error("Recipient permanently unreachable: {reason}")]
    Permanent {
        /// Transport-provided description
        reason: String,
    },

    /// Any other failure. A later attempt may succeed.
    #[error("Delivery failed: {reason}")]
    Transient {
        /// Transport-provided description
        reason: String,
    },
}

impl DeliveryError {
    /// Creates a permanent failure.
    #[must_use]
    pub fn permanent(reason: impl Into<String>) -> Self {
        Self::Permanent {
            reason: reason.into(),
        }
    }

    /// Creates a transient failure.
    #[must_use]
    pub fn transient(reason: impl Into<String>) -> Self {
        Self::Transient {
            reason: reason.into(),
        }
    }

    /// Returns true if the recipient should be removed.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent { .. })
    }
}

/// Trait for sending a text message to a single recipient.
///
/// Implementations classify their failures into [`DeliveryError`] variants;
/// they do not retry.
pub trait MessageSender: Send + Sync {
    /// Sends `text` to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Permanent`] when the recipient is gone for
    /// good and [`DeliveryError::Transient`] for anything else.
    fn send(
        &self,
        recipient: SubscriberId,
        text: &str,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

impl<T: MessageSender> MessageSender for Arc<T> {
    async fn send(&self, recipient: SubscriberId, text: &str) -> Result<(), DeliveryError> {
        (**self).send(recipient, text).await
    }
}
