//! In-memory append-only signal store.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::signals::SignalEvent;
use crate::ports::SignalStore;

/// In-memory `SignalStore` over an append-only vector.
///
/// A single vector keeps global append order; per-user reads filter it.
pub struct InMemorySignalStore {
    events: RwLock<Vec<SignalEvent>>,
}

impl InMemorySignalStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
        }
    }

    /// Total number of appended events (test helper).
    pub fn len(&self) -> usize {
        self.events
            .read()
            .expect("InMemorySignalStore: lock poisoned")
            .len()
    }

    /// True when the log is empty (test helper).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemorySignalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalStore for InMemorySignalStore {
    async fn append(&self, event: SignalEvent) -> Result<(), DomainError> {
        self.events
            .write()
            .expect("InMemorySignalStore: lock poisoned")
            .push(event);
        Ok(())
    }

    async fn events_for_user(&self, user_id: &UserId) -> Result<Vec<SignalEvent>, DomainError> {
        Ok(self
            .events
            .read()
            .expect("InMemorySignalStore: lock poisoned")
            .iter()
            .filter(|e| &e.user_id == user_id)
            .cloned()
            .collect())
    }
}
