//! JourneyRepository port - persistence contract for journeys.
//!
//! The storage implementation is out of scope for the core; these methods
//! dictate the shape it must provide.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, JourneyId, Timestamp, UserId};
use crate::domain::journey::Journey;

/// Filter for gallery listings, newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GalleryFilter {
    pub date_from: Option<Timestamp>,
    pub date_to: Option<Timestamp>,
    /// Maximum entries to return; `None` means the adapter's default.
    pub limit: Option<usize>,
    pub offset: usize,
}

impl GalleryFilter {
    /// A filter returning everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Builder: restrict to entries created at or after `from`.
    pub fn since(mut self, from: Timestamp) -> Self {
        self.date_from = Some(from);
        self
    }

    /// Builder: cap the number of entries returned.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Builder: skip the first `offset` entries.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// Port for journey persistence.
#[async_trait]
pub trait JourneyRepository: Send + Sync {
    /// Persists a newly created journey.
    async fn save(&self, journey: &Journey) -> Result<(), DomainError>;

    /// Replaces the stored journey after a mutation.
    async fn update(&self, journey: &Journey) -> Result<(), DomainError>;

    /// Loads a journey by id.
    async fn find_by_id(&self, id: &JourneyId) -> Result<Option<Journey>, DomainError>;

    /// Lists a user's gallery, newest first, applying the filter.
    async fn find_by_user(
        &self,
        user_id: &UserId,
        filter: &GalleryFilter,
    ) -> Result<Vec<Journey>, DomainError>;

    /// Counts all journeys stored for a user.
    async fn count_by_user(&self, user_id: &UserId) -> Result<usize, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn JourneyRepository) {}

    #[test]
    fn filter_builder_composes() {
        let from = Timestamp::from_unix_secs(1000);
        let filter = GalleryFilter::all().since(from).with_limit(20).with_offset(5);
        assert_eq!(filter.date_from, Some(from));
        assert_eq!(filter.limit, Some(20));
        assert_eq!(filter.offset, 5);
    }
}
