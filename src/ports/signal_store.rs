//! SignalStore port - append-only persistence for behavioral signals.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::signals::{SignalEvent, SignalSummary};

/// Port for the append-only signal log.
///
/// `append` is the only write; events are never mutated or deleted.
/// Concurrent appends for different users need no coordination; appends for
/// the same user are ordered by arrival.
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// Appends one event to the log.
    async fn append(&self, event: SignalEvent) -> Result<(), DomainError>;

    /// Returns a user's events in append order.
    async fn events_for_user(&self, user_id: &UserId) -> Result<Vec<SignalEvent>, DomainError>;

    /// Folds a user's events into their summary.
    ///
    /// A pure read over the log; adapters inherit this so every store
    /// summarizes identically.
    async fn summarize(&self, user_id: &UserId) -> Result<SignalSummary, DomainError> {
        Ok(SignalSummary::from_events(
            &self.events_for_user(user_id).await?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn SignalStore) {}
}
