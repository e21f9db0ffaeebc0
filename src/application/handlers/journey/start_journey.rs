//! StartJourneyHandler - opens a journey from a diary submission.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::foundation::{
    domain_event, CommandMetadata, DomainError, ErrorCode, EventId, JourneyId,
    SerializableDomainEvent, Timestamp, UserId, ValidationError, VadScore,
};
use crate::domain::journey::Journey;
use crate::ports::{EventPublisher, JourneyRepository, UserRepository};

/// Command to open a journey.
///
/// The VAD triple arrives raw from the emotion-analysis service and is
/// validated here, before any external call.
#[derive(Debug, Clone)]
pub struct StartJourneyCommand {
    pub diary_text: String,
    pub emotion_keywords: Vec<String>,
    pub vad: (f64, f64, f64),
}

/// Event published when a journey opens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyStartedEvent {
    pub event_id: EventId,
    pub journey_id: JourneyId,
    pub user_id: UserId,
    pub started_at: Timestamp,
}

domain_event!(
    JourneyStartedEvent,
    event_type = "journey.started.v1",
    schema_version = 1,
    aggregate_id = journey_id,
    aggregate_type = "Journey",
    occurred_at = started_at,
    event_id = event_id
);

/// Error type for starting a journey.
#[derive(Debug, Clone)]
pub enum StartJourneyError {
    /// No profile exists for the requesting user.
    UnknownUser(UserId),
    /// Malformed diary text or VAD score.
    InvalidInput(ValidationError),
    /// Any other domain-level failure.
    Domain(DomainError),
}

impl std::fmt::Display for StartJourneyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartJourneyError::UnknownUser(id) => write!(f, "Unknown user: {}", id),
            StartJourneyError::InvalidInput(err) => write!(f, "{}", err),
            StartJourneyError::Domain(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for StartJourneyError {}

impl From<DomainError> for StartJourneyError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::EmptyField | ErrorCode::OutOfRange | ErrorCode::InvalidFormat => {
                StartJourneyError::InvalidInput(ValidationError::invalid_format(
                    "input",
                    err.message.clone(),
                ))
            }
            _ => StartJourneyError::Domain(err),
        }
    }
}

impl From<ValidationError> for StartJourneyError {
    fn from(err: ValidationError) -> Self {
        StartJourneyError::InvalidInput(err)
    }
}

/// Handler for opening journeys.
pub struct StartJourneyHandler {
    journey_repository: Arc<dyn JourneyRepository>,
    user_repository: Arc<dyn UserRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl StartJourneyHandler {
    pub fn new(
        journey_repository: Arc<dyn JourneyRepository>,
        user_repository: Arc<dyn UserRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            journey_repository,
            user_repository,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartJourneyCommand,
        metadata: CommandMetadata,
    ) -> Result<Journey, StartJourneyError> {
        // 1. Validate input before touching anything external.
        let (valence, arousal, dominance) = cmd.vad;
        let vad = VadScore::new(valence, arousal, dominance)?;

        // 2. The owner must be onboarded.
        let profile = self
            .user_repository
            .find_by_id(&metadata.user_id)
            .await
            .map_err(StartJourneyError::Domain)?
            .ok_or_else(|| StartJourneyError::UnknownUser(metadata.user_id.clone()))?;
        if profile.is_archived() {
            return Err(StartJourneyError::Domain(
                DomainError::new(ErrorCode::ValidationFailed, "user profile is archived")
                    .with_detail("user_id", metadata.user_id.to_string()),
            ));
        }

        // 3. Open and persist the journey.
        let mut journey = Journey::new(
            metadata.user_id.clone(),
            cmd.diary_text,
            cmd.emotion_keywords,
            vad,
        )?;
        journey.take_events();

        self.journey_repository
            .save(&journey)
            .await
            .map_err(StartJourneyError::Domain)?;

        info!(journey_id = %journey.id(), user_id = %metadata.user_id, "journey opened");

        // 4. Publish the event.
        let event = JourneyStartedEvent {
            event_id: EventId::new(),
            journey_id: journey.id(),
            user_id: metadata.user_id.clone(),
            started_at: journey.created_at(),
        };
        let envelope = event
            .to_envelope()
            .with_correlation_id(metadata.correlation_id())
            .with_user_id(metadata.user_id.to_string());
        self.event_publisher
            .publish(envelope)
            .await
            .map_err(StartJourneyError::Domain)?;

        Ok(journey)
    }
}
