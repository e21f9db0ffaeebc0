//! TrainingService port - interface for the external fine-tuning pipeline.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{TrainingJobId, UserId};

/// Reference to the dataset a training job should consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetRef(String);

impl DatasetRef {
    /// Creates a dataset reference.
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// The conventional dataset location for a user's gallery history.
    pub fn for_user(user_id: &UserId) -> Self {
        Self(format!("datasets/{}/gallery", user_id))
    }

    /// Returns the inner reference string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Failures the trainer can report at submission time.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TrainingError {
    /// Transient trainer failure.
    #[error("training service unavailable: {message}")]
    ServiceUnavailable { message: String },

    /// The dataset does not meet the trainer's prerequisites, even though
    /// the promotion thresholds passed. Requires human attention, not retry.
    #[error("insufficient training data: {reason}")]
    InsufficientData { reason: String },
}

impl TrainingError {
    /// Creates a service unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Creates an insufficient data error.
    pub fn insufficient_data(reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            reason: reason.into(),
        }
    }
}

/// Port for submitting fine-tuning jobs.
///
/// The at-most-one-in-flight-per-user invariant is enforced by the caller
/// (the personalization engine), not by implementations of this port.
#[async_trait]
pub trait TrainingService: Send + Sync {
    /// Submits a training job and returns the trainer-assigned job id.
    async fn submit_training_job(
        &self,
        user_id: &UserId,
        dataset: &DatasetRef,
    ) -> Result<TrainingJobId, TrainingError>;
}
