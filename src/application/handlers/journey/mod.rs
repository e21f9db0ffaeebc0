//! Journey command handlers - one file per operation.

mod advance_to_closure;
mod advance_to_defusion;
mod advance_to_reflection;
mod get_journey;
mod list_gallery;
mod start_journey;

pub use advance_to_closure::{
    AdvanceToClosureCommand, AdvanceToClosureHandler, AdvanceToClosureResult,
    JourneyCompletedEvent,
};
pub use advance_to_defusion::{
    AdvanceToDefusionCommand, AdvanceToDefusionHandler, AdvanceToDefusionResult,
    GuestbookSignedEvent,
};
pub use advance_to_reflection::{
    AdvanceToReflectionCommand, AdvanceToReflectionHandler, AdvanceToReflectionResult,
    ReflectionReachedEvent,
};
pub use get_journey::{GetJourneyHandler, GetJourneyResult};
pub use list_gallery::{ListGalleryHandler, ListGalleryResult};
pub use start_journey::{JourneyStartedEvent, StartJourneyCommand, StartJourneyHandler};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::foundation::{
    domain_event, CommandMetadata, DomainError, ErrorCode, EventId, JourneyId,
    SerializableDomainEvent, Timestamp, ValidationError,
};
use crate::domain::journey::{Journey, JourneyStage};
use crate::domain::safety::RejectionCategory;
use crate::ports::{EventPublisher, GenerationError, JourneyRepository};

/// Opaque token returned with `ContentRejected`, letting the caller retry
/// the advance while the journey still has regeneration budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryToken {
    pub journey_id: JourneyId,
    pub attempts_used: u32,
    pub attempts_remaining: u32,
}

/// Event published when the safety gate freezes a journey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyEscalatedEvent {
    pub event_id: EventId,
    pub journey_id: JourneyId,
    /// The stage the frozen artifact was destined for.
    pub destined_stage: JourneyStage,
    pub category: RejectionCategory,
    pub escalated_at: Timestamp,
}

domain_event!(
    JourneyEscalatedEvent,
    event_type = "journey.escalated.v1",
    schema_version = 1,
    aggregate_id = journey_id,
    aggregate_type = "Journey",
    occurred_at = escalated_at,
    event_id = event_id
);

/// Error type shared by the three advance operations.
#[derive(Debug, Clone)]
pub enum AdvanceError {
    /// No journey with the given id.
    JourneyNotFound(JourneyId),
    /// Another operation holds the journey; retry the whole call.
    ConcurrentModification(JourneyId),
    /// The safety gate rejected the artifact.
    ContentRejected {
        category: RejectionCategory,
        /// Present when automatic regeneration budget remains.
        retry_token: Option<RetryToken>,
    },
    /// Crisis content froze the journey; terminal for the artifact.
    Escalated { category: RejectionCategory },
    /// The regeneration budget is spent for this journey.
    GenerationUnavailable { attempts: u32 },
    /// A capability stayed down through the retry budget.
    ServiceUnavailable { capability: &'static str },
    /// Malformed caller input, rejected before any external call.
    InvalidInput(ValidationError),
    /// Any other domain-level failure (wrong stage, sealed journey, ...).
    Domain(DomainError),
}

impl std::fmt::Display for AdvanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdvanceError::JourneyNotFound(id) => write!(f, "Journey not found: {}", id),
            AdvanceError::ConcurrentModification(id) => {
                write!(f, "Journey {} is being advanced concurrently", id)
            }
            AdvanceError::ContentRejected { category, .. } => {
                write!(f, "Content rejected ({})", category)
            }
            AdvanceError::Escalated { category } => {
                write!(f, "Journey escalated for human review ({})", category)
            }
            AdvanceError::GenerationUnavailable { attempts } => {
                write!(f, "Generation unavailable after {} attempts", attempts)
            }
            AdvanceError::ServiceUnavailable { capability } => {
                write!(f, "Capability unavailable: {}", capability)
            }
            AdvanceError::InvalidInput(err) => write!(f, "{}", err),
            AdvanceError::Domain(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AdvanceError {}

impl From<DomainError> for AdvanceError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ConcurrentModification => {
                let journey_id = err
                    .details
                    .get("journey_id")
                    .and_then(|raw| raw.parse().ok())
                    .unwrap_or_default();
                AdvanceError::ConcurrentModification(journey_id)
            }
            _ => AdvanceError::Domain(err),
        }
    }
}

impl From<ValidationError> for AdvanceError {
    fn from(err: ValidationError) -> Self {
        AdvanceError::InvalidInput(err)
    }
}

/// Records a crisis escalation on the journey, persists it, publishes the
/// event, and returns the error to surface.
///
/// The escalation must be durable before the caller sees any response, so
/// a persistence failure here surfaces as a domain error instead of
/// `Escalated`.
pub(crate) async fn freeze_journey(
    journey_repository: &Arc<dyn JourneyRepository>,
    event_publisher: &Arc<dyn EventPublisher>,
    journey: &mut Journey,
    destined_stage: JourneyStage,
    category: RejectionCategory,
    metadata: &CommandMetadata,
) -> AdvanceError {
    if let Err(e) = journey.record_escalation(destined_stage, category) {
        return AdvanceError::Domain(e);
    }
    journey.take_events();

    if let Err(e) = journey_repository.update(journey).await {
        return AdvanceError::Domain(e);
    }

    let event = JourneyEscalatedEvent {
        event_id: EventId::new(),
        journey_id: journey.id(),
        destined_stage,
        category,
        escalated_at: Timestamp::now(),
    };
    let envelope = event
        .to_envelope()
        .with_correlation_id(metadata.correlation_id())
        .with_user_id(metadata.user_id.to_string());
    if let Err(e) = event_publisher.publish(envelope).await {
        // The escalation is already recorded; a lost bus event is logged
        // and the caller still sees the escalation.
        warn!(journey_id = %journey.id(), error = %e, "failed to publish escalation event");
    }

    AdvanceError::Escalated { category }
}

/// Maps a capability failure (after the retry budget) to an advance error.
pub(crate) fn map_generation_error(
    err: GenerationError,
    capability: &'static str,
) -> AdvanceError {
    match err {
        GenerationError::InvalidContext { reason } => {
            AdvanceError::InvalidInput(ValidationError::invalid_format(
                "generation_context",
                reason,
            ))
        }
        _ => AdvanceError::ServiceUnavailable { capability },
    }
}
