//! Concurrent-safe registry of notification subscribers.
//!
//! The registry is the only state shared between the monitor task and the
//! command handlers. Every operation holds the lock for its whole duration,
//! so no caller ever observes a half-applied add or remove.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Opaque recipient handle assigned by the messaging transport.
///
/// For Telegram this is the chat id the bot replies into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub i64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SubscriberId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Thread-safe set of subscriber identifiers.
///
/// Share it behind an [`std::sync::Arc`]. Membership is in-memory only and
/// starts empty on every process start.
///
/// # Example
///
/// ```
/// use rate_watch::subscribers::{SubscriberId, SubscriberRegistry};
///
/// let registry = SubscriberRegistry::new();
/// assert!(registry.add(SubscriberId(42)));
/// assert!(!registry.add(SubscriberId(42)));
///
/// let snapshot = registry.snapshot();
/// registry.remove(SubscriberId(42));
/// assert_eq!(snapshot, vec![SubscriberId(42)]);
/// ```
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    members: Mutex<HashSet<SubscriberId>>,
}

impl SubscriberRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber. Returns `false` if it was already present.
    pub fn add(&self, id: SubscriberId) -> bool {
        self.lock().insert(id)
    }

    /// Removes a subscriber. Returns `false` if it was not present.
    pub fn remove(&self, id: SubscriberId) -> bool {
        self.lock().remove(&id)
    }

    /// Returns true if the subscriber is present.
    #[must_use]
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.lock().contains(&id)
    }

    /// Returns an independent copy of the current membership.
    ///
    /// The copy reflects a single point in time and is unaffected by later
    /// mutations of the registry. Order is unspecified.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SubscriberId> {
        self.lock().iter().copied().collect()
    }

    /// Returns the number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic elsewhere cannot leave a HashSet half-updated, so a poisoned
    // lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashSet<SubscriberId>> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
