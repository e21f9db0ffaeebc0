//! In-memory personalization state store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::personalization::PersonalizationState;
use crate::ports::PersonalizationStore;

/// In-memory `PersonalizationStore` backed by a map.
pub struct InMemoryPersonalizationStore {
    states: RwLock<HashMap<UserId, PersonalizationState>>,
}

impl InMemoryPersonalizationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryPersonalizationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersonalizationStore for InMemoryPersonalizationStore {
    async fn load(&self, user_id: &UserId) -> Result<Option<PersonalizationState>, DomainError> {
        Ok(self
            .states
            .read()
            .expect("InMemoryPersonalizationStore: lock poisoned")
            .get(user_id)
            .cloned())
    }

    async fn save(&self, state: &PersonalizationState) -> Result<(), DomainError> {
        self.states
            .write()
            .expect("InMemoryPersonalizationStore: lock poisoned")
            .insert(state.user_id().clone(), state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::personalization::PersonalizationTier;

    #[tokio::test]
    async fn load_returns_none_for_unknown_user() {
        let store = InMemoryPersonalizationStore::new();
        let loaded = store.load(&UserId::new("ghost").unwrap()).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = InMemoryPersonalizationStore::new();
        let user = UserId::new("user-1").unwrap();

        let mut state = PersonalizationState::new(user.clone());
        state.promote_to(PersonalizationTier::Adaptive).unwrap();
        store.save(&state).await.unwrap();

        let loaded = store.load(&user).await.unwrap().unwrap();
        assert_eq!(loaded.tier(), PersonalizationTier::Adaptive);
    }
}
