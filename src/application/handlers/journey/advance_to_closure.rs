//! AdvanceToClosureHandler - generates the curator message and seals the
//! journey at Closure.
//!
//! On success the journey becomes immutable, a `JourneyCompleted` signal is
//! appended for the owner, and tier re-evaluation is expected to follow.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::info;

use crate::config::GenerationConfig;
use crate::domain::cost::CostOwner;
use crate::domain::foundation::{
    domain_event, CommandMetadata, CopingStyle, DomainError, ErrorCode, EventId, JourneyId,
    SerializableDomainEvent, Timestamp, UserId,
};
use crate::domain::journey::{Journey, JourneyStage};
use crate::domain::safety::{ContentKind, GateSubject, SafetyGate, Verdict};
use crate::domain::signals::SignalEvent;
use crate::ports::{
    EventPublisher, GenerationContext, JourneyRepository, SignalStore,
};

use super::{freeze_journey, map_generation_error, AdvanceError, RetryToken};
use crate::application::locks::JourneyLocks;
use crate::application::pipeline::GenerationPipeline;

/// Command to seal a journey.
#[derive(Debug, Clone)]
pub struct AdvanceToClosureCommand {
    pub journey_id: JourneyId,
}

/// Result of a successful closure.
#[derive(Debug, Clone)]
pub struct AdvanceToClosureResult {
    pub journey: Journey,
}

/// Event published when a journey seals at Closure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyCompletedEvent {
    pub event_id: EventId,
    pub journey_id: JourneyId,
    pub user_id: UserId,
    pub completed_at: Timestamp,
}

domain_event!(
    JourneyCompletedEvent,
    event_type = "journey.completed.v1",
    schema_version = 1,
    aggregate_id = journey_id,
    aggregate_type = "Journey",
    occurred_at = completed_at,
    event_id = event_id
);

/// Handler for the Defusion → Closure advance.
pub struct AdvanceToClosureHandler {
    journey_repository: Arc<dyn JourneyRepository>,
    signal_store: Arc<dyn SignalStore>,
    gate: Arc<SafetyGate>,
    pipeline: Arc<GenerationPipeline>,
    event_publisher: Arc<dyn EventPublisher>,
    locks: Arc<JourneyLocks>,
    generation: GenerationConfig,
}

impl AdvanceToClosureHandler {
    pub fn new(
        journey_repository: Arc<dyn JourneyRepository>,
        signal_store: Arc<dyn SignalStore>,
        gate: Arc<SafetyGate>,
        pipeline: Arc<GenerationPipeline>,
        event_publisher: Arc<dyn EventPublisher>,
        locks: Arc<JourneyLocks>,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            journey_repository,
            signal_store,
            gate,
            pipeline,
            event_publisher,
            locks,
            generation,
        }
    }

    pub async fn handle(
        &self,
        cmd: AdvanceToClosureCommand,
        metadata: CommandMetadata,
    ) -> Result<AdvanceToClosureResult, AdvanceError> {
        // 1. Serialize per journey, failing fast on contention.
        let _guard = self.locks.try_acquire(cmd.journey_id)?;

        // 2. Load and pre-check the journey.
        let mut journey = self
            .journey_repository
            .find_by_id(&cmd.journey_id)
            .await?
            .ok_or(AdvanceError::JourneyNotFound(cmd.journey_id))?;

        if let Some(note) = journey.escalation() {
            return Err(AdvanceError::Escalated {
                category: note.category,
            });
        }
        journey.ensure_mutable()?;
        if journey.stage() != JourneyStage::Defusion {
            return Err(AdvanceError::Domain(
                DomainError::new(
                    ErrorCode::InvalidStateTransition,
                    format!("journey is at {:?}, expected Defusion", journey.stage()),
                )
                .with_detail("journey_id", cmd.journey_id.to_string()),
            ));
        }

        // 3. Build the curator context from the full journey.
        let coping_style = journey.coping_style().unwrap_or(CopingStyle::Balanced);
        let mut context = GenerationContext::new(
            journey.diary_text(),
            journey.vad(),
            JourneyStage::Closure,
            coping_style,
        );
        if let Some(reflection) = journey.reflection() {
            context = context.with_history_line(format!("reflection prompt: {}", reflection.prompt));
        }
        if let Some(guestbook) = journey.guestbook() {
            context = context.with_history_line(format!(
                "the visitor titled this '{}' and wrote: {}",
                guestbook.title, guestbook.text
            ));
        }

        let owner = CostOwner::Journey(journey.id());
        let subject = GateSubject {
            journey_id: journey.id(),
            user_id: journey.user_id().clone(),
            destined_stage: JourneyStage::Closure,
        };

        // 4. Generate and validate within the regeneration budget.
        let mut attempts_this_call = 0u32;
        let message = loop {
            let text = self
                .pipeline
                .generate_text(&owner, &context)
                .await
                .map_err(|e| map_generation_error(e, "text_generation"))?;

            match self
                .gate
                .validate(&text.text, ContentKind::CuratorMessage, &subject)
            {
                Verdict::Escalated(category) => {
                    return Err(freeze_journey(
                        &self.journey_repository,
                        &self.event_publisher,
                        &mut journey,
                        JourneyStage::Closure,
                        category,
                        &metadata,
                    )
                    .await);
                }
                Verdict::Rejected(category) => {
                    journey.note_regeneration_attempt();
                    attempts_this_call += 1;

                    let total = journey.regeneration_attempts();
                    let remaining = self.generation.regeneration_budget.saturating_sub(total);

                    if attempts_this_call < self.generation.max_regeneration_attempts
                        && remaining > 0
                    {
                        sleep(self.generation.regeneration_backoff()).await;
                        continue;
                    }

                    self.journey_repository.update(&journey).await?;
                    return Err(if remaining == 0 {
                        AdvanceError::GenerationUnavailable { attempts: total }
                    } else {
                        AdvanceError::ContentRejected {
                            category,
                            retry_token: Some(RetryToken {
                                journey_id: journey.id(),
                                attempts_used: total,
                                attempts_remaining: remaining,
                            }),
                        }
                    });
                }
                Verdict::Approved => break text.text,
            }
        };

        // 5. Seal the journey.
        journey.attach_curator_message(message)?;
        journey.take_events();
        self.journey_repository.update(&journey).await?;

        info!(journey_id = %journey.id(), user_id = %journey.user_id(), "journey sealed at Closure");

        // 6. Record the completion signal for the owner.
        self.signal_store
            .append(SignalEvent::journey_completed(journey.user_id().clone()))
            .await?;

        // 7. Publish the completion event.
        let event = JourneyCompletedEvent {
            event_id: EventId::new(),
            journey_id: journey.id(),
            user_id: journey.user_id().clone(),
            completed_at: journey.updated_at(),
        };
        let envelope = event
            .to_envelope()
            .with_correlation_id(metadata.correlation_id())
            .with_user_id(metadata.user_id.to_string());
        self.event_publisher.publish(envelope).await?;

        Ok(AdvanceToClosureResult { journey })
    }
}
