//! Personalization command handlers.

mod complete_training;
mod evaluate_tier;
mod request_training;

pub use complete_training::{
    CompleteTrainingCommand, CompleteTrainingHandler, TrainingFailedEvent,
};
pub use evaluate_tier::{EvaluateTierCommand, EvaluateTierHandler, TierEvaluation};
pub use request_training::{
    RequestTrainingCommand, RequestTrainingHandler, TrainingRequestOutcome,
    TrainingRequestedEvent,
};

use serde::{Deserialize, Serialize};

use crate::config::PersonalizationConfig;
use crate::domain::foundation::{
    domain_event, DomainError, EventId, Timestamp, UserId,
};
use crate::domain::personalization::PersonalizationTier;
use crate::domain::signals::SignalSummary;

/// Event published when a user's tier increases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierPromotedEvent {
    pub event_id: EventId,
    pub user_id: UserId,
    pub tier: PersonalizationTier,
    pub promoted_at: Timestamp,
}

domain_event!(
    TierPromotedEvent,
    event_type = "personalization.tier_promoted.v1",
    schema_version = 1,
    aggregate_id = user_id,
    aggregate_type = "Personalization",
    occurred_at = promoted_at,
    event_id = event_id
);

/// Error type shared by the personalization operations.
#[derive(Debug, Clone)]
pub enum PersonalizationError {
    /// No profile exists for the user.
    UnknownUser(UserId),
    /// The trainer stayed down.
    ServiceUnavailable { message: String },
    /// The trainer refused the dataset despite the thresholds passing.
    InsufficientData { reason: String },
    /// Any other domain-level failure.
    Domain(DomainError),
}

impl std::fmt::Display for PersonalizationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersonalizationError::UnknownUser(id) => write!(f, "Unknown user: {}", id),
            PersonalizationError::ServiceUnavailable { message } => {
                write!(f, "Training service unavailable: {}", message)
            }
            PersonalizationError::InsufficientData { reason } => {
                write!(f, "Insufficient training data: {}", reason)
            }
            PersonalizationError::Domain(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for PersonalizationError {}

impl From<DomainError> for PersonalizationError {
    fn from(err: DomainError) -> Self {
        PersonalizationError::Domain(err)
    }
}

/// Tier 2 gate: sustained engagement over a minimum number of completions.
pub(crate) fn tier2_eligible(summary: &SignalSummary, config: &PersonalizationConfig) -> bool {
    summary.journeys_completed >= config.tier2_min_completed_journeys
        && summary.engagement_score >= config.tier2_engagement_floor
}

/// Tier 3 gate: accumulated reactions and completions.
pub(crate) fn tier3_eligible(summary: &SignalSummary, config: &PersonalizationConfig) -> bool {
    summary.positive_reactions >= config.tier3_min_positive_reactions
        && summary.journeys_completed >= config.tier3_min_completed_journeys
}
