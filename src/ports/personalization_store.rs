//! PersonalizationStore port - persistence contract for per-user tier state.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::personalization::PersonalizationState;

/// Port for personalization state persistence.
///
/// Writers for the same user must be serialized by the caller (the
/// request-training handler holds a per-user lock across its
/// read-evaluate-write); the store itself only promises atomic individual
/// reads and writes.
#[async_trait]
pub trait PersonalizationStore: Send + Sync {
    /// Loads a user's state, if any has been saved.
    async fn load(&self, user_id: &UserId) -> Result<Option<PersonalizationState>, DomainError>;

    /// Saves the state, replacing any previous version.
    async fn save(&self, state: &PersonalizationState) -> Result<(), DomainError>;
}
