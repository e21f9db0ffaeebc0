//! UserRepository port - persistence contract for user profiles.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::user::UserProfile;

/// Port for user profile persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a newly onboarded profile.
    async fn save(&self, profile: &UserProfile) -> Result<(), DomainError>;

    /// Replaces the stored profile after a mutation.
    async fn update(&self, profile: &UserProfile) -> Result<(), DomainError>;

    /// Loads a profile by user id.
    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<UserProfile>, DomainError>;

    /// True when a profile exists (archived or not).
    async fn exists(&self, user_id: &UserId) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn UserRepository) {}
}
