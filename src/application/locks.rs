//! Keyed exclusion for journeys and users.
//!
//! Journeys are serialized fail-fast: a second concurrent advance on the
//! same journey id gets `ConcurrentModification` immediately instead of
//! queueing. Personalization writes are serialized by waiting: the
//! read-evaluate-write of the outstanding-job field must be atomic per
//! user, and callers are few enough that blocking is fine there.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::foundation::{DomainError, ErrorCode, JourneyId, UserId};

/// Held while an operation owns a journey; dropping releases the journey.
pub struct JourneyGuard {
    _permit: OwnedMutexGuard<()>,
}

/// Per-journey try-lock registry.
pub struct JourneyLocks {
    locks: Mutex<HashMap<JourneyId, Arc<AsyncMutex<()>>>>,
}

impl JourneyLocks {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquires the journey's lock without waiting.
    ///
    /// Fails fast with `ConcurrentModification` when another operation
    /// holds the journey, as blocking here could deadlock an interleaved
    /// pair of advances.
    pub fn try_acquire(&self, journey_id: JourneyId) -> Result<JourneyGuard, DomainError> {
        let lock = {
            let mut locks = self.locks.lock().expect("JourneyLocks: registry poisoned");
            Arc::clone(locks.entry(journey_id).or_default())
        };

        match lock.try_lock_owned() {
            Ok(permit) => Ok(JourneyGuard { _permit: permit }),
            Err(_) => Err(DomainError::new(
                ErrorCode::ConcurrentModification,
                "journey is being advanced by another operation",
            )
            .with_detail("journey_id", journey_id.to_string())),
        }
    }
}

impl Default for JourneyLocks {
    fn default() -> Self {
        Self::new()
    }
}

/// Held while an operation owns a user's personalization state.
pub struct UserGuard {
    _permit: OwnedMutexGuard<()>,
}

/// Per-user waiting lock registry.
pub struct UserLocks {
    locks: Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>,
}

impl UserLocks {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquires the user's lock, waiting for any current holder.
    pub async fn acquire(&self, user_id: &UserId) -> UserGuard {
        let lock = {
            let mut locks = self.locks.lock().expect("UserLocks: registry poisoned");
            Arc::clone(locks.entry(user_id.clone()).or_default())
        };
        UserGuard {
            _permit: lock.lock_owned().await,
        }
    }
}

impl Default for UserLocks {
    fn default() -> Self {
        Self::new()
    }
}
