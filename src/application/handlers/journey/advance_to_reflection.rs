//! AdvanceToReflectionHandler - generates prompt + image and advances
//! Moment → Reflection.
//!
//! Both artifacts pass the safety gate before attachment. Rejections are
//! retried automatically with a fixed backoff while the journey's
//! regeneration budget lasts; crisis verdicts freeze the journey.

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
use crate::domain::personalization::StyleProfile;
use crate::domain::safety::{ContentKind, GateSubject, SafetyGate, Verdict};
use crate::ports::{
    EventPublisher, GenerationContext, JourneyRepository, PersonalizationStore, SignalStore,
    UserRepository,
};

use super::{
    freeze_journey, map_generation_error, AdvanceError, RetryToken,
};
use crate::application::locks::JourneyLocks;
use crate::application::pipeline::GenerationPipeline;

/// Command to advance a journey into Reflection.
#[derive(Debug, Clone)]
pub struct AdvanceToReflectionCommand {
    pub journey_id: JourneyId,
    /// The requesting user's current coping style, recorded on the journey.
    pub coping_style: CopingStyle,
}

/// Result of a successful advance.
#[derive(Debug, Clone)]
pub struct AdvanceToReflectionResult {
    pub journey: Journey,
}

/// Event published when a journey reaches Reflection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectionReachedEvent {
    pub event_id: EventId,
    pub journey_id: JourneyId,
    pub user_id: UserId,
    pub reached_at: Timestamp,
}

domain_event!(
    ReflectionReachedEvent,
    event_type = "journey.reflection_reached.v1",
    schema_version = 1,
    aggregate_id = journey_id,
    aggregate_type = "Journey",
    occurred_at = reached_at,
    event_id = event_id
);

/// Handler for the Moment → Reflection advance.
pub struct AdvanceToReflectionHandler {
    journey_repository: Arc<dyn JourneyRepository>,
    user_repository: Arc<dyn UserRepository>,
    signal_store: Arc<dyn SignalStore>,
    personalization_store: Arc<dyn PersonalizationStore>,
    gate: Arc<SafetyGate>,
    pipeline: Arc<GenerationPipeline>,
    event_publisher: Arc<dyn EventPublisher>,
    locks: Arc<JourneyLocks>,
    generation: GenerationConfig,
}

impl AdvanceToReflectionHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        journey_repository: Arc<dyn JourneyRepository>,
        user_repository: Arc<dyn UserRepository>,
        signal_store: Arc<dyn SignalStore>,
        personalization_store: Arc<dyn PersonalizationStore>,
        gate: Arc<SafetyGate>,
        pipeline: Arc<GenerationPipeline>,
        event_publisher: Arc<dyn EventPublisher>,
        locks: Arc<JourneyLocks>,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            journey_repository,
            user_repository,
            signal_store,
            personalization_store,
            gate,
            pipeline,
            event_publisher,
            locks,
            generation,
        }
    }

    pub async fn handle(
        &self,
        cmd: AdvanceToReflectionCommand,
        metadata: CommandMetadata,
    ) -> Result<AdvanceToReflectionResult, AdvanceError> {
        // 1. Serialize per journey, failing fast on contention.
        let _guard = self.locks.try_acquire(cmd.journey_id)?;

        // 2. Load and pre-check the journey.
        let mut journey = self
            .journey_repository
            .find_by_id(&cmd.journey_id)
            .await?
            .ok_or(AdvanceError::JourneyNotFound(cmd.journey_id))?;

        if let Some(note) = journey.escalation() {
            // Frozen journeys never get a fresh generation attempt.
            return Err(AdvanceError::Escalated {
                category: note.category,
            });
        }
        journey.ensure_mutable()?;
        if journey.stage() != JourneyStage::Moment {
            return Err(AdvanceError::Domain(
                DomainError::new(
                    ErrorCode::InvalidStateTransition,
                    format!("journey is at {:?}, expected Moment", journey.stage()),
                )
                .with_detail("journey_id", cmd.journey_id.to_string()),
            ));
        }

        // 3. Resolve the style profile for this user's tier.
        let profile = self
            .user_repository
            .find_by_id(journey.user_id())
            .await?
            .ok_or_else(|| {
                AdvanceError::Domain(DomainError::new(
                    ErrorCode::UnknownUser,
                    format!("no profile for user {}", journey.user_id()),
                ))
            })?;
        let style = self
            .style_profile(journey.user_id(), profile.visual_preferences())
            .await?;

        let owner = CostOwner::Journey(journey.id());
        let subject = GateSubject {
            journey_id: journey.id(),
            user_id: journey.user_id().clone(),
            destined_stage: JourneyStage::Reflection,
        };

        let mut context = GenerationContext::new(
            journey.diary_text(),
            journey.vad(),
            JourneyStage::Reflection,
            cmd.coping_style,
        );
        if !journey.emotion_keywords().is_empty() {
            context = context
                .with_history_line(format!("keywords: {}", journey.emotion_keywords().join(", ")));
        }

        // 4. Generate, validate, and regenerate within budget.
        let mut attempts_this_call = 0u32;
        'regenerate: loop {
            let text = self
                .pipeline
                .generate_text(&owner, &context)
                .await
                .map_err(|e| map_generation_error(e, "text_generation"))?;

            match self.gate.validate(&text.text, ContentKind::ReflectionPrompt, &subject) {
                Verdict::Escalated(category) => {
                    return Err(freeze_journey(
                        &self.journey_repository,
                        &self.event_publisher,
                        &mut journey,
                        JourneyStage::Reflection,
                        category,
                        &metadata,
                    )
                    .await);
                }
                Verdict::Rejected(category) => {
                    match self
                        .note_rejection(&mut journey, category, &mut attempts_this_call)
                        .await?
                    {
                        RejectionNext::Retry => continue 'regenerate,
                        RejectionNext::Surface(err) => return Err(err),
                    }
                }
                Verdict::Approved => {}
            }

            let image_ref = self
                .pipeline
                .generate_image(&owner, &text.text, &style)
                .await
                .map_err(|e| map_generation_error(e, "image_generation"))?;

            match self.gate.validate(image_ref.as_str(), ContentKind::GeneratedImage, &subject) {
                Verdict::Escalated(category) => {
                    return Err(freeze_journey(
                        &self.journey_repository,
                        &self.event_publisher,
                        &mut journey,
                        JourneyStage::Reflection,
                        category,
                        &metadata,
                    )
                    .await);
                }
                Verdict::Rejected(category) => {
                    match self
                        .note_rejection(&mut journey, category, &mut attempts_this_call)
                        .await?
                    {
                        RejectionNext::Retry => continue 'regenerate,
                        RejectionNext::Surface(err) => return Err(err),
                    }
                }
                Verdict::Approved => {
                    journey.attach_reflection(cmd.coping_style, text.text, image_ref)?;
                    journey.take_events();
                    self.journey_repository.update(&journey).await?;

                    info!(journey_id = %journey.id(), "journey reached Reflection");

                    let event = ReflectionReachedEvent {
                        event_id: EventId::new(),
                        journey_id: journey.id(),
                        user_id: journey.user_id().clone(),
                        reached_at: journey.updated_at(),
                    };
                    let envelope = event
                        .to_envelope()
                        .with_correlation_id(metadata.correlation_id())
                        .with_user_id(metadata.user_id.to_string());
                    self.event_publisher.publish(envelope).await?;

                    return Ok(AdvanceToReflectionResult { journey });
                }
            }
        }
    }

    async fn style_profile(
        &self,
        user_id: &UserId,
        preferences: &crate::domain::user::VisualPreferences,
    ) -> Result<StyleProfile, AdvanceError> {
        let tier = self
            .personalization_store
            .load(user_id)
            .await?
            .map(|state| state.tier())
            .unwrap_or_default();
        let summary = self.signal_store.summarize(user_id).await?;
        Ok(StyleProfile::for_tier(tier, &summary, preferences))
    }

    /// Books one rejected attempt; either schedules a retry (after the
    /// fixed backoff) or persists the spent attempt and surfaces an error.
    async fn note_rejection(
        &self,
        journey: &mut Journey,
        category: crate::domain::safety::RejectionCategory,
        attempts_this_call: &mut u32,
    ) -> Result<RejectionNext, AdvanceError> {
        journey.note_regeneration_attempt();
        *attempts_this_call += 1;

        let total = journey.regeneration_attempts();
        let remaining = self.generation.regeneration_budget.saturating_sub(total);

        if *attempts_this_call < self.generation.max_regeneration_attempts && remaining > 0 {
            sleep(self.generation.regeneration_backoff()).await;
            return Ok(RejectionNext::Retry);
        }

        self.journey_repository.update(journey).await?;

        if remaining == 0 {
            Ok(RejectionNext::Surface(AdvanceError::GenerationUnavailable {
                attempts: total,
            }))
        } else {
            Ok(RejectionNext::Surface(AdvanceError::ContentRejected {
                category,
                retry_token: Some(RetryToken {
                    journey_id: journey.id(),
                    attempts_used: total,
                    attempts_remaining: remaining,
                }),
            }))
        }
    }
}

enum RejectionNext {
    Retry,
    Surface(AdvanceError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        InMemoryCostLedger, InMemoryEventBus, InMemoryJourneyRepository,
        InMemoryPersonalizationStore, InMemorySignalStore, InMemoryUserRepository,
        LoggingReviewNotifier, MockImageGenerator, MockTextGenerator,
    };
    use crate::application::retry::RetryPolicy;
    use crate::config::CostConfig;
    use crate::domain::cost::CostWindow;
    use crate::domain::foundation::VadScore;
    use crate::domain::safety::{RejectionCategory, RuleSet};
    use crate::domain::user::{UserProfile, VisualPreferences};
    use crate::ports::{CostLedger, GenerationError, ImageGenerator, TextGenerator};

    struct Fixture {
        handler: AdvanceToReflectionHandler,
        journeys: Arc<InMemoryJourneyRepository>,
        text: Arc<MockTextGenerator>,
        image: Arc<MockImageGenerator>,
        ledger: Arc<InMemoryCostLedger>,
        bus: Arc<InMemoryEventBus>,
        locks: Arc<JourneyLocks>,
    }

    fn test_user() -> UserId {
        UserId::new("test-user-123").unwrap()
    }

    fn fixture() -> Fixture {
        let journeys = Arc::new(InMemoryJourneyRepository::new());
        let users = Arc::new(InMemoryUserRepository::with_profile(UserProfile::new(
            test_user(),
            CopingStyle::Balanced,
            VisualPreferences::default(),
        )));
        let text = Arc::new(MockTextGenerator::new());
        let image = Arc::new(MockImageGenerator::new());
        let ledger = Arc::new(InMemoryCostLedger::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let locks = Arc::new(JourneyLocks::new());

        let generation = GenerationConfig {
            regeneration_backoff_ms: 0,
            transient_backoff_base_ms: 0,
            ..Default::default()
        };

        let pipeline = Arc::new(GenerationPipeline::new(
            Arc::clone(&text) as Arc<dyn TextGenerator>,
            Arc::clone(&image) as Arc<dyn ImageGenerator>,
            Arc::clone(&ledger) as Arc<dyn CostLedger>,
            RetryPolicy::from_config(&generation),
            CostConfig::default(),
        ));

        let handler = AdvanceToReflectionHandler::new(
            Arc::clone(&journeys) as Arc<dyn JourneyRepository>,
            users,
            Arc::new(InMemorySignalStore::new()),
            Arc::new(InMemoryPersonalizationStore::new()),
            Arc::new(SafetyGate::new(
                RuleSet::builtin(),
                Arc::new(LoggingReviewNotifier::new()),
            )),
            pipeline,
            Arc::clone(&bus) as Arc<dyn EventPublisher>,
            Arc::clone(&locks),
            generation,
        );

        Fixture {
            handler,
            journeys,
            text,
            image,
            ledger,
            bus,
            locks,
        }
    }

    async fn seed_journey(f: &Fixture) -> JourneyId {
        let journey = Journey::new(
            test_user(),
            "today felt heavy",
            vec!["heavy".to_string()],
            VadScore::new(0.2, 0.6, 0.4).unwrap(),
        )
        .unwrap();
        let id = journey.id();
        f.journeys.save(&journey).await.unwrap();
        id
    }

    fn command(journey_id: JourneyId) -> AdvanceToReflectionCommand {
        AdvanceToReflectionCommand {
            journey_id,
            coping_style: CopingStyle::Balanced,
        }
    }

    #[tokio::test]
    async fn approved_artifacts_advance_to_reflection() {
        let f = fixture();
        let id = seed_journey(&f).await;

        let result = f
            .handler
            .handle(command(id), CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert_eq!(result.journey.stage(), JourneyStage::Reflection);
        assert!(result.journey.reflection().unwrap().safety.is_approved());
        assert!(f.bus.has_event("journey.reflection_reached.v1"));

        // One text call + one image call charged.
        let owner = CostOwner::Journey(id);
        assert_eq!(f.ledger.total(&owner, &CostWindow::all()).await.unwrap(), 12);
    }

    #[tokio::test]
    async fn missing_journey_is_reported() {
        let f = fixture();
        let result = f
            .handler
            .handle(command(JourneyId::new()), CommandMetadata::test_fixture())
            .await;
        assert!(matches!(result, Err(AdvanceError::JourneyNotFound(_))));
    }

    #[tokio::test]
    async fn rejected_prompt_is_regenerated_automatically() {
        let f = fixture();
        let id = seed_journey(&f).await;

        // First prompt trips the violence rule, second is clean.
        f.text.enqueue_text("a scene of gore");
        f.text.enqueue_text("a quiet grey harbor");

        let result = f
            .handler
            .handle(command(id), CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert_eq!(result.journey.stage(), JourneyStage::Reflection);
        assert_eq!(result.journey.reflection().unwrap().prompt, "a quiet grey harbor");
        assert_eq!(f.text.call_count(), 2);
    }

    #[tokio::test]
    async fn persistent_rejection_surfaces_retry_token() {
        let f = fixture();
        let id = seed_journey(&f).await;

        // Every generation trips the violence rule; per-call budget is 2.
        for _ in 0..4 {
            f.text.enqueue_text("a scene of gore");
        }

        let result = f
            .handler
            .handle(command(id), CommandMetadata::test_fixture())
            .await;

        match result {
            Err(AdvanceError::ContentRejected {
                category,
                retry_token: Some(token),
            }) => {
                assert_eq!(category, RejectionCategory::Violence);
                assert_eq!(token.journey_id, id);
                assert_eq!(token.attempts_used, 2);
                assert!(token.attempts_remaining > 0);
            }
            other => panic!("expected ContentRejected with token, got {:?}", other.err()),
        }

        // Journey stayed at Moment with the attempts persisted.
        let journey = f.journeys.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(journey.stage(), JourneyStage::Moment);
        assert_eq!(journey.regeneration_attempts(), 2);
    }

    #[tokio::test]
    async fn exhausted_budget_reports_generation_unavailable() {
        let f = fixture();
        let id = seed_journey(&f).await;

        // Budget is 6; three calls of two attempts each spend it.
        for _ in 0..8 {
            f.text.enqueue_text("a scene of gore");
        }
        for call in 0..3 {
            let result = f
                .handler
                .handle(command(id), CommandMetadata::test_fixture())
                .await;
            if call < 2 {
                assert!(matches!(result, Err(AdvanceError::ContentRejected { .. })));
            } else {
                assert!(matches!(
                    result,
                    Err(AdvanceError::GenerationUnavailable { attempts: 6 })
                ));
            }
        }
    }

    #[tokio::test]
    async fn escalated_image_freezes_journey_at_moment() {
        let f = fixture();
        let id = seed_journey(&f).await;

        // Clean prompt, crisis-tripping image descriptor.
        f.image.enqueue_image("renders/self-harm-imagery.png");

        let result = f
            .handler
            .handle(command(id), CommandMetadata::test_fixture())
            .await;
        assert!(matches!(
            result,
            Err(AdvanceError::Escalated { category: RejectionCategory::SelfHarm })
        ));

        let journey = f.journeys.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(journey.stage(), JourneyStage::Moment);
        assert!(journey.is_escalated());
        assert!(f.bus.has_event("journey.escalated.v1"));
    }

    #[tokio::test]
    async fn escalated_journey_gets_no_fresh_generation() {
        let f = fixture();
        let id = seed_journey(&f).await;
        f.image.enqueue_image("renders/self-harm-imagery.png");

        let _ = f
            .handler
            .handle(command(id), CommandMetadata::test_fixture())
            .await;
        let calls_after_freeze = f.text.call_count();

        let second = f
            .handler
            .handle(command(id), CommandMetadata::test_fixture())
            .await;
        assert!(matches!(second, Err(AdvanceError::Escalated { .. })));
        assert_eq!(f.text.call_count(), calls_after_freeze);
    }

    #[tokio::test]
    async fn unavailable_capability_surfaces_after_retries() {
        let f = fixture();
        let id = seed_journey(&f).await;

        // Default transient budget is 3 retries → 4 attempts.
        for _ in 0..4 {
            f.text.enqueue_error(GenerationError::unavailable("down"));
        }

        let result = f
            .handler
            .handle(command(id), CommandMetadata::test_fixture())
            .await;
        assert!(matches!(
            result,
            Err(AdvanceError::ServiceUnavailable { capability: "text_generation" })
        ));

        // Every failed attempt was charged.
        let owner = CostOwner::Journey(id);
        assert_eq!(f.ledger.total(&owner, &CostWindow::all()).await.unwrap(), 8);
    }

    #[tokio::test]
    async fn held_lock_fails_fast_with_concurrent_modification() {
        let f = fixture();
        let id = seed_journey(&f).await;

        let _guard = f.locks.try_acquire(id).unwrap();
        let result = f
            .handler
            .handle(command(id), CommandMetadata::test_fixture())
            .await;
        assert!(matches!(result, Err(AdvanceError::ConcurrentModification(held)) if held == id));
    }

    #[tokio::test]
    async fn wrong_stage_is_rejected_without_generation() {
        let f = fixture();
        let id = seed_journey(&f).await;

        // First advance succeeds.
        f.handler
            .handle(command(id), CommandMetadata::test_fixture())
            .await
            .unwrap();
        let calls = f.text.call_count();

        // Second advance finds the journey at Reflection already.
        let result = f
            .handler
            .handle(command(id), CommandMetadata::test_fixture())
            .await;
        assert!(matches!(result, Err(AdvanceError::Domain(_))));
        assert_eq!(f.text.call_count(), calls);
    }
}
