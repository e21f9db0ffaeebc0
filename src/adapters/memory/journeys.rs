//! In-memory journey repository for tests and local runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, JourneyId, UserId};
use crate::domain::journey::Journey;
use crate::ports::{GalleryFilter, JourneyRepository};

/// In-memory `JourneyRepository` backed by a map.
///
/// Lock poisoning panics; acceptable for test/dev code, not for a
/// production store.
pub struct InMemoryJourneyRepository {
    journeys: RwLock<HashMap<JourneyId, Journey>>,
}

impl InMemoryJourneyRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self {
            journeys: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored journeys (test helper).
    pub fn len(&self) -> usize {
        self.journeys
            .read()
            .expect("InMemoryJourneyRepository: lock poisoned")
            .len()
    }

    /// True when nothing is stored (test helper).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryJourneyRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JourneyRepository for InMemoryJourneyRepository {
    async fn save(&self, journey: &Journey) -> Result<(), DomainError> {
        let mut journeys = self
            .journeys
            .write()
            .expect("InMemoryJourneyRepository: lock poisoned");
        if journeys.contains_key(&journey.id()) {
            return Err(DomainError::new(
                ErrorCode::StorageError,
                format!("journey {} already exists", journey.id()),
            ));
        }
        journeys.insert(journey.id(), journey.clone());
        Ok(())
    }

    async fn update(&self, journey: &Journey) -> Result<(), DomainError> {
        let mut journeys = self
            .journeys
            .write()
            .expect("InMemoryJourneyRepository: lock poisoned");
        if !journeys.contains_key(&journey.id()) {
            return Err(DomainError::new(
                ErrorCode::JourneyNotFound,
                format!("journey {} does not exist", journey.id()),
            ));
        }
        journeys.insert(journey.id(), journey.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &JourneyId) -> Result<Option<Journey>, DomainError> {
        Ok(self
            .journeys
            .read()
            .expect("InMemoryJourneyRepository: lock poisoned")
            .get(id)
            .cloned())
    }

    async fn find_by_user(
        &self,
        user_id: &UserId,
        filter: &GalleryFilter,
    ) -> Result<Vec<Journey>, DomainError> {
        let journeys = self
            .journeys
            .read()
            .expect("InMemoryJourneyRepository: lock poisoned");

        let mut matching: Vec<Journey> = journeys
            .values()
            .filter(|j| j.user_id() == user_id)
            .filter(|j| {
                filter
                    .date_from
                    .map_or(true, |from| !j.created_at().is_before(&from))
            })
            .filter(|j| filter.date_to.map_or(true, |to| j.created_at().is_before(&to)))
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        let page: Vec<Journey> = matching
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit.unwrap_or(usize::MAX))
            .collect();
        Ok(page)
    }

    async fn count_by_user(&self, user_id: &UserId) -> Result<usize, DomainError> {
        Ok(self
            .journeys
            .read()
            .expect("InMemoryJourneyRepository: lock poisoned")
            .values()
            .filter(|j| j.user_id() == user_id)
            .count())
    }
}
