//! AdvanceToDefusionHandler - accepts the guestbook entry and advances
//! Reflection → Defusion.
//!
//! The guestbook is user-authored, so there is no automatic retry budget:
//! a rejection returns without state change and the user may resubmit
//! edited text as often as needed. Crisis content still escalates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::foundation::{
    domain_event, CommandMetadata, EventId, JourneyId, SerializableDomainEvent, Timestamp, UserId,
};
use crate::domain::journey::{GuestbookEntry, Journey, JourneyStage};
use crate::domain::safety::{ContentKind, GateSubject, SafetyGate, Verdict};
use crate::ports::{EventPublisher, JourneyRepository};

use super::{freeze_journey, AdvanceError};
use crate::application::locks::JourneyLocks;

/// Command carrying the user-authored guestbook entry.
#[derive(Debug, Clone)]
pub struct AdvanceToDefusionCommand {
    pub journey_id: JourneyId,
    pub guestbook_title: String,
    pub guestbook_tags: Vec<String>,
    pub guestbook_text: String,
    /// Optional prompt the client showed while titling.
    pub guided_question: Option<String>,
}

/// Result of a successful advance.
#[derive(Debug, Clone)]
pub struct AdvanceToDefusionResult {
    pub journey: Journey,
}

/// Event published when the guestbook is signed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestbookSignedEvent {
    pub event_id: EventId,
    pub journey_id: JourneyId,
    pub user_id: UserId,
    pub signed_at: Timestamp,
}

domain_event!(
    GuestbookSignedEvent,
    event_type = "journey.guestbook_signed.v1",
    schema_version = 1,
    aggregate_id = journey_id,
    aggregate_type = "Journey",
    occurred_at = signed_at,
    event_id = event_id
);

/// Handler for the Reflection → Defusion advance.
pub struct AdvanceToDefusionHandler {
    journey_repository: Arc<dyn JourneyRepository>,
    gate: Arc<SafetyGate>,
    event_publisher: Arc<dyn EventPublisher>,
    locks: Arc<JourneyLocks>,
}

impl AdvanceToDefusionHandler {
    pub fn new(
        journey_repository: Arc<dyn JourneyRepository>,
        gate: Arc<SafetyGate>,
        event_publisher: Arc<dyn EventPublisher>,
        locks: Arc<JourneyLocks>,
    ) -> Self {
        Self {
            journey_repository,
            gate,
            event_publisher,
            locks,
        }
    }

    pub async fn handle(
        &self,
        cmd: AdvanceToDefusionCommand,
        metadata: CommandMetadata,
    ) -> Result<AdvanceToDefusionResult, AdvanceError> {
        // 1. Serialize per journey, failing fast on contention.
        let _guard = self.locks.try_acquire(cmd.journey_id)?;

        // 2. Validate the entry shape before loading anything.
        let entry = GuestbookEntry::new(
            cmd.guestbook_title,
            cmd.guestbook_tags,
            cmd.guestbook_text,
            cmd.guided_question,
        )?;

        // 3. Load and pre-check the journey.
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

        // 4. Gate the user-authored text.
        let subject = GateSubject {
            journey_id: journey.id(),
            user_id: journey.user_id().clone(),
            destined_stage: JourneyStage::Defusion,
        };
        match self
            .gate
            .validate(&entry.combined_text(), ContentKind::Guestbook, &subject)
        {
            Verdict::Escalated(category) => {
                return Err(freeze_journey(
                    &self.journey_repository,
                    &self.event_publisher,
                    &mut journey,
                    JourneyStage::Defusion,
                    category,
                    &metadata,
                )
                .await);
            }
            Verdict::Rejected(category) => {
                // No state change, no retry token: the user edits and
                // resubmits without limit.
                return Err(AdvanceError::ContentRejected {
                    category,
                    retry_token: None,
                });
            }
            Verdict::Approved => {}
        }

        // 5. Attach and persist.
        journey.attach_guestbook(entry)?;
        journey.take_events();
        self.journey_repository.update(&journey).await?;

        info!(journey_id = %journey.id(), "guestbook signed, journey at Defusion");

        let event = GuestbookSignedEvent {
            event_id: EventId::new(),
            journey_id: journey.id(),
            user_id: journey.user_id().clone(),
            signed_at: journey.updated_at(),
        };
        let envelope = event
            .to_envelope()
            .with_correlation_id(metadata.correlation_id())
            .with_user_id(metadata.user_id.to_string());
        self.event_publisher.publish(envelope).await?;

        Ok(AdvanceToDefusionResult { journey })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        InMemoryEventBus, InMemoryJourneyRepository, LoggingReviewNotifier,
    };
    use crate::domain::foundation::{CopingStyle, VadScore};
    use crate::domain::journey::ImageRef;
    use crate::domain::safety::{RejectionCategory, RuleSet};

    struct Fixture {
        handler: AdvanceToDefusionHandler,
        journeys: Arc<InMemoryJourneyRepository>,
        bus: Arc<InMemoryEventBus>,
    }

    fn test_user() -> UserId {
        UserId::new("test-user-123").unwrap()
    }

    fn fixture() -> Fixture {
        let journeys = Arc::new(InMemoryJourneyRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let handler = AdvanceToDefusionHandler::new(
            Arc::clone(&journeys) as Arc<dyn JourneyRepository>,
            Arc::new(SafetyGate::new(
                RuleSet::builtin(),
                Arc::new(LoggingReviewNotifier::new()),
            )),
            Arc::clone(&bus) as Arc<dyn EventPublisher>,
            Arc::new(JourneyLocks::new()),
        );
        Fixture {
            handler,
            journeys,
            bus,
        }
    }

    async fn seed_journey_at_reflection(f: &Fixture) -> JourneyId {
        let mut journey = Journey::new(
            test_user(),
            "today felt heavy",
            vec![],
            VadScore::new(0.2, 0.6, 0.4).unwrap(),
        )
        .unwrap();
        journey
            .attach_reflection(
                CopingStyle::Balanced,
                "a quiet grey harbor",
                ImageRef::new("img/1.png").unwrap(),
            )
            .unwrap();
        let id = journey.id();
        f.journeys.save(&journey).await.unwrap();
        id
    }

    fn command(journey_id: JourneyId) -> AdvanceToDefusionCommand {
        AdvanceToDefusionCommand {
            journey_id,
            guestbook_title: "The Weight".to_string(),
            guestbook_tags: vec!["grief".to_string()],
            guestbook_text: "I see this feeling, I don't have to fix it".to_string(),
            guided_question: Some("What would you name this feeling?".to_string()),
        }
    }

    #[tokio::test]
    async fn approved_guestbook_advances_to_defusion() {
        let f = fixture();
        let id = seed_journey_at_reflection(&f).await;

        let result = f
            .handler
            .handle(command(id), CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert_eq!(result.journey.stage(), JourneyStage::Defusion);
        let guestbook = result.journey.guestbook().unwrap();
        assert_eq!(guestbook.title, "The Weight");
        assert!(guestbook.safety.is_approved());
        assert!(f.bus.has_event("journey.guestbook_signed.v1"));
    }

    #[tokio::test]
    async fn rejection_leaves_state_and_allows_resubmission() {
        let f = fixture();
        let id = seed_journey_at_reflection(&f).await;

        let mut rejected = command(id);
        rejected.guestbook_text = "a scene of gore".to_string();

        let result = f
            .handler
            .handle(rejected, CommandMetadata::test_fixture())
            .await;
        assert!(matches!(
            result,
            Err(AdvanceError::ContentRejected {
                category: RejectionCategory::Violence,
                retry_token: None,
            })
        ));

        // Journey unchanged; the edited resubmission succeeds.
        let journey = f.journeys.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(journey.stage(), JourneyStage::Reflection);

        let result = f
            .handler
            .handle(command(id), CommandMetadata::test_fixture())
            .await
            .unwrap();
        assert_eq!(result.journey.stage(), JourneyStage::Defusion);
    }

    #[tokio::test]
    async fn crisis_guestbook_escalates_and_freezes() {
        let f = fixture();
        let id = seed_journey_at_reflection(&f).await;

        let mut crisis = command(id);
        crisis.guestbook_text = "some days I think about suicide".to_string();

        let result = f
            .handler
            .handle(crisis, CommandMetadata::test_fixture())
            .await;
        assert!(matches!(
            result,
            Err(AdvanceError::Escalated { category: RejectionCategory::SelfHarm })
        ));

        let journey = f.journeys.find_by_id(&id).await.unwrap().unwrap();
        assert!(journey.is_escalated());
        assert_eq!(journey.stage(), JourneyStage::Reflection);

        // Resubmission is refused while frozen.
        let again = f
            .handler
            .handle(command(id), CommandMetadata::test_fixture())
            .await;
        assert!(matches!(again, Err(AdvanceError::Escalated { .. })));
    }

    #[tokio::test]
    async fn empty_title_is_invalid_input() {
        let f = fixture();
        let id = seed_journey_at_reflection(&f).await;

        let mut cmd = command(id);
        cmd.guestbook_title = "".to_string();

        let result = f.handler.handle(cmd, CommandMetadata::test_fixture()).await;
        assert!(matches!(result, Err(AdvanceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn wrong_stage_is_rejected() {
        let f = fixture();

        // Journey still at Moment.
        let journey = Journey::new(
            test_user(),
            "entry",
            vec![],
            VadScore::new(0.5, 0.5, 0.5).unwrap(),
        )
        .unwrap();
        let id = journey.id();
        f.journeys.save(&journey).await.unwrap();

        let result = f
            .handler
            .handle(command(id), CommandMetadata::test_fixture())
            .await;
        assert!(matches!(result, Err(AdvanceError::Domain(_))));
    }

    #[tokio::test]
    async fn concurrent_signings_leave_exactly_one_winner() {
        let f = fixture();
        let id = seed_journey_at_reflection(&f).await;

        let handler = Arc::new(f.handler);
        let first = {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                handler.handle(command(id), CommandMetadata::test_fixture()).await
            })
        };
        let second = {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                handler.handle(command(id), CommandMetadata::test_fixture()).await
            })
        };

        let outcomes = [first.await.unwrap(), second.await.unwrap()];
        let successes = outcomes.iter().filter(|r| r.is_ok()).count();
        let conflicts = outcomes
            .iter()
            .filter(|r| {
                matches!(
                    r,
                    Err(AdvanceError::ConcurrentModification(_)) | Err(AdvanceError::Domain(_))
                )
            })
            .count();

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 1);

        let journey = f.journeys.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(journey.stage(), JourneyStage::Defusion);
    }
}
