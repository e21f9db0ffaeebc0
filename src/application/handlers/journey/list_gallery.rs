//! ListGalleryHandler - a user's journeys, newest first.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::journey::Journey;
use crate::ports::{GalleryFilter, JourneyRepository, UserRepository};

/// A page of the user's gallery.
#[derive(Debug, Clone)]
pub struct ListGalleryResult {
    pub journeys: Vec<Journey>,
    /// Total journeys for the user, ignoring the filter.
    pub total: usize,
}

/// Handler for gallery listings.
pub struct ListGalleryHandler {
    journey_repository: Arc<dyn JourneyRepository>,
    user_repository: Arc<dyn UserRepository>,
}

impl ListGalleryHandler {
    pub fn new(
        journey_repository: Arc<dyn JourneyRepository>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            journey_repository,
            user_repository,
        }
    }

    pub async fn handle(
        &self,
        user_id: &UserId,
        filter: GalleryFilter,
    ) -> Result<ListGalleryResult, DomainError> {
        if !self.user_repository.exists(user_id).await? {
            return Err(DomainError::new(
                ErrorCode::UnknownUser,
                format!("no profile for user {}", user_id),
            ));
        }

        let journeys = self.journey_repository.find_by_user(user_id, &filter).await?;
        let total = self.journey_repository.count_by_user(user_id).await?;

        Ok(ListGalleryResult { journeys, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryJourneyRepository, InMemoryUserRepository};
    use crate::domain::foundation::{CopingStyle, VadScore};
    use crate::domain::user::{UserProfile, VisualPreferences};
    use crate::ports::JourneyRepository as _;

    fn test_user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    async fn fixture_with_journeys(count: usize) -> ListGalleryHandler {
        let journeys = Arc::new(InMemoryJourneyRepository::new());
        for _ in 0..count {
            journeys
                .save(
                    &Journey::new(
                        test_user(),
                        "entry",
                        vec![],
                        VadScore::new(0.5, 0.5, 0.5).unwrap(),
                    )
                    .unwrap(),
                )
                .await
                .unwrap();
        }
        let users = Arc::new(InMemoryUserRepository::with_profile(UserProfile::new(
            test_user(),
            CopingStyle::Balanced,
            VisualPreferences::default(),
        )));
        ListGalleryHandler::new(journeys, users)
    }

    #[tokio::test]
    async fn lists_with_limit_and_total() {
        let handler = fixture_with_journeys(5).await;

        let result = handler
            .handle(&test_user(), GalleryFilter::all().with_limit(3))
            .await
            .unwrap();

        assert_eq!(result.journeys.len(), 3);
        assert_eq!(result.total, 5);
    }

    #[tokio::test]
    async fn unknown_user_is_rejected() {
        let handler = fixture_with_journeys(0).await;
        let result = handler
            .handle(&UserId::new("ghost").unwrap(), GalleryFilter::all())
            .await;
        assert!(matches!(
            result,
            Err(DomainError { code: ErrorCode::UnknownUser, .. })
        ));
    }
}
