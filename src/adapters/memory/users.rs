//! In-memory user repository for tests and local runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::user::UserProfile;
use crate::ports::UserRepository;

/// In-memory `UserRepository` backed by a map.
pub struct InMemoryUserRepository {
    profiles: RwLock<HashMap<UserId, UserProfile>>,
}

impl InMemoryUserRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
        }
    }

    /// Convenience constructor seeding one profile (test helper).
    pub fn with_profile(profile: UserProfile) -> Self {
        let repo = Self::new();
        repo.profiles
            .write()
            .expect("InMemoryUserRepository: lock poisoned")
            .insert(profile.user_id().clone(), profile);
        repo
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, profile: &UserProfile) -> Result<(), DomainError> {
        let mut profiles = self
            .profiles
            .write()
            .expect("InMemoryUserRepository: lock poisoned");
        if profiles.contains_key(profile.user_id()) {
            return Err(DomainError::new(
                ErrorCode::StorageError,
                format!("user {} already exists", profile.user_id()),
            ));
        }
        profiles.insert(profile.user_id().clone(), profile.clone());
        Ok(())
    }

    async fn update(&self, profile: &UserProfile) -> Result<(), DomainError> {
        let mut profiles = self
            .profiles
            .write()
            .expect("InMemoryUserRepository: lock poisoned");
        if !profiles.contains_key(profile.user_id()) {
            return Err(DomainError::new(
                ErrorCode::UnknownUser,
                format!("user {} does not exist", profile.user_id()),
            ));
        }
        profiles.insert(profile.user_id().clone(), profile.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<UserProfile>, DomainError> {
        Ok(self
            .profiles
            .read()
            .expect("InMemoryUserRepository: lock poisoned")
            .get(user_id)
            .cloned())
    }

    async fn exists(&self, user_id: &UserId) -> Result<bool, DomainError> {
        Ok(self
            .profiles
            .read()
            .expect("InMemoryUserRepository: lock poisoned")
            .contains_key(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::CopingStyle;
    use crate::domain::user::VisualPreferences;

    fn profile(id: &str) -> UserProfile {
        UserProfile::new(
            UserId::new(id).unwrap(),
            CopingStyle::Balanced,
            VisualPreferences::default(),
        )
    }

    #[tokio::test]
    async fn save_then_exists_round_trips() {
        let repo = InMemoryUserRepository::new();
        repo.save(&profile("user-1")).await.unwrap();

        assert!(repo.exists(&UserId::new("user-1").unwrap()).await.unwrap());
        assert!(!repo.exists(&UserId::new("user-2").unwrap()).await.unwrap());
    }

    #[tokio::test]
    async fn update_replaces_stored_profile() {
        let repo = InMemoryUserRepository::new();
        let mut p = profile("user-1");
        repo.save(&p).await.unwrap();

        p.set_coping_style(CopingStyle::Avoidant);
        repo.update(&p).await.unwrap();

        let stored = repo
            .find_by_id(&UserId::new("user-1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.coping_style(), CopingStyle::Avoidant);
    }

    #[tokio::test]
    async fn update_unknown_user_fails() {
        let repo = InMemoryUserRepository::new();
        let result = repo.update(&profile("ghost")).await;
        assert!(matches!(
            result,
            Err(DomainError { code: ErrorCode::UnknownUser, .. })
        ));
    }
}
