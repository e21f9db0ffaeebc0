//! CompleteTrainingHandler - closes out a training job reported by the
//! trainer.
//!
//! Success promotes the user to FineTuned; failure keeps the current tier
//! and records the failure. There is no automatic resubmission: training
//! failures usually mean a data-quality problem a human has to look at.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::foundation::{
    domain_event, CommandMetadata, DomainError, ErrorCode, EventId, SerializableDomainEvent,
    Timestamp, TrainingJobId, UserId,
};
use crate::domain::personalization::{PersonalizationTier, TrainingOutcome};
use crate::ports::{EventPublisher, PersonalizationStore};

use super::{PersonalizationError, TierPromotedEvent};
use crate::application::locks::UserLocks;

/// Command carrying the trainer's completion report.
#[derive(Debug, Clone)]
pub struct CompleteTrainingCommand {
    pub user_id: UserId,
    pub job_id: TrainingJobId,
    pub success: bool,
    /// Trainer-supplied reason when `success` is false.
    pub failure_reason: Option<String>,
}

/// Event published when a training job fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingFailedEvent {
    pub event_id: EventId,
    pub user_id: UserId,
    pub job_id: TrainingJobId,
    pub reason: String,
    pub failed_at: Timestamp,
}

domain_event!(
    TrainingFailedEvent,
    event_type = "personalization.training_failed.v1",
    schema_version = 1,
    aggregate_id = user_id,
    aggregate_type = "Personalization",
    occurred_at = failed_at,
    event_id = event_id
);

/// Handler for training completion reports.
pub struct CompleteTrainingHandler {
    personalization_store: Arc<dyn PersonalizationStore>,
    event_publisher: Arc<dyn EventPublisher>,
    locks: Arc<UserLocks>,
}

impl CompleteTrainingHandler {
    pub fn new(
        personalization_store: Arc<dyn PersonalizationStore>,
        event_publisher: Arc<dyn EventPublisher>,
        locks: Arc<UserLocks>,
    ) -> Self {
        Self {
            personalization_store,
            event_publisher,
            locks,
        }
    }

    pub async fn handle(
        &self,
        cmd: CompleteTrainingCommand,
        metadata: CommandMetadata,
    ) -> Result<TrainingOutcome, PersonalizationError> {
        // Single writer for this user's outstanding-job field.
        let _guard = self.locks.acquire(&cmd.user_id).await;

        let mut state = self
            .personalization_store
            .load(&cmd.user_id)
            .await?
            .ok_or_else(|| {
                PersonalizationError::Domain(DomainError::new(
                    ErrorCode::NoOutstandingTrainingJob,
                    format!("no personalization state for user {}", cmd.user_id),
                ))
            })?;

        let outcome =
            state.complete_training(&cmd.job_id, cmd.success, cmd.failure_reason.clone())?;
        self.personalization_store.save(&state).await?;

        match outcome {
            TrainingOutcome::Promoted => {
                info!(user_id = %cmd.user_id, job_id = %cmd.job_id, "training complete, promoted to FineTuned");

                let event = TierPromotedEvent {
                    event_id: EventId::new(),
                    user_id: cmd.user_id.clone(),
                    tier: PersonalizationTier::FineTuned,
                    promoted_at: Timestamp::now(),
                };
                let envelope = event
                    .to_envelope()
                    .with_correlation_id(metadata.correlation_id())
                    .with_user_id(metadata.user_id.to_string());
                self.event_publisher.publish(envelope).await?;
            }
            TrainingOutcome::Failed => {
                let reason = cmd
                    .failure_reason
                    .unwrap_or_else(|| "training failed".to_string());
                warn!(user_id = %cmd.user_id, job_id = %cmd.job_id, reason = %reason, "training failed, tier unchanged");

                let event = TrainingFailedEvent {
                    event_id: EventId::new(),
                    user_id: cmd.user_id.clone(),
                    job_id: cmd.job_id.clone(),
                    reason,
                    failed_at: Timestamp::now(),
                };
                let envelope = event
                    .to_envelope()
                    .with_correlation_id(metadata.correlation_id())
                    .with_user_id(metadata.user_id.to_string());
                self.event_publisher.publish(envelope).await?;
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryEventBus, InMemoryPersonalizationStore};
    use crate::domain::personalization::PersonalizationState;
    use crate::ports::PersonalizationStore as _;

    fn test_user() -> UserId {
        UserId::new("test-user-123").unwrap()
    }

    fn job(id: &str) -> TrainingJobId {
        TrainingJobId::new(id).unwrap()
    }

    struct Fixture {
        handler: CompleteTrainingHandler,
        store: Arc<InMemoryPersonalizationStore>,
        bus: Arc<InMemoryEventBus>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryPersonalizationStore::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let handler = CompleteTrainingHandler::new(
            Arc::clone(&store) as Arc<dyn PersonalizationStore>,
            Arc::clone(&bus) as Arc<dyn EventPublisher>,
            Arc::new(UserLocks::new()),
        );
        Fixture { handler, store, bus }
    }

    async fn seed_outstanding_job(f: &Fixture, job_id: &TrainingJobId) {
        let mut state = PersonalizationState::new(test_user());
        state.promote_to(PersonalizationTier::Adaptive).unwrap();
        state.begin_training(job_id.clone()).unwrap();
        f.store.save(&state).await.unwrap();
    }

    #[tokio::test]
    async fn success_promotes_to_fine_tuned() {
        let f = fixture();
        seed_outstanding_job(&f, &job("job-1")).await;

        let outcome = f
            .handler
            .handle(
                CompleteTrainingCommand {
                    user_id: test_user(),
                    job_id: job("job-1"),
                    success: true,
                    failure_reason: None,
                },
                CommandMetadata::test_fixture(),
            )
            .await
            .unwrap();

        assert_eq!(outcome, TrainingOutcome::Promoted);

        let state = f.store.load(&test_user()).await.unwrap().unwrap();
        assert_eq!(state.tier(), PersonalizationTier::FineTuned);
        assert!(!state.has_outstanding_job());
        assert!(f.bus.has_event("personalization.tier_promoted.v1"));
    }

    #[tokio::test]
    async fn failure_keeps_tier_and_records_reason() {
        let f = fixture();
        seed_outstanding_job(&f, &job("job-1")).await;

        let outcome = f
            .handler
            .handle(
                CompleteTrainingCommand {
                    user_id: test_user(),
                    job_id: job("job-1"),
                    success: false,
                    failure_reason: Some("dataset too sparse".to_string()),
                },
                CommandMetadata::test_fixture(),
            )
            .await
            .unwrap();

        assert_eq!(outcome, TrainingOutcome::Failed);

        let state = f.store.load(&test_user()).await.unwrap().unwrap();
        assert_eq!(state.tier(), PersonalizationTier::Adaptive);
        assert!(!state.has_outstanding_job());
        assert_eq!(state.last_failure().unwrap().reason, "dataset too sparse");
        assert!(f.bus.has_event("personalization.training_failed.v1"));
        assert!(!f.bus.has_event("personalization.tier_promoted.v1"));
    }

    #[tokio::test]
    async fn unknown_job_id_is_rejected() {
        let f = fixture();
        seed_outstanding_job(&f, &job("job-1")).await;

        let result = f
            .handler
            .handle(
                CompleteTrainingCommand {
                    user_id: test_user(),
                    job_id: job("job-other"),
                    success: true,
                    failure_reason: None,
                },
                CommandMetadata::test_fixture(),
            )
            .await;
        assert!(matches!(result, Err(PersonalizationError::Domain(_))));

        // The real job stays outstanding.
        let state = f.store.load(&test_user()).await.unwrap().unwrap();
        assert_eq!(state.outstanding_job(), Some(&job("job-1")));
    }

    #[tokio::test]
    async fn completion_without_state_is_rejected() {
        let f = fixture();
        let result = f
            .handler
            .handle(
                CompleteTrainingCommand {
                    user_id: test_user(),
                    job_id: job("job-1"),
                    success: true,
                    failure_reason: None,
                },
                CommandMetadata::test_fixture(),
            )
            .await;
        assert!(matches!(result, Err(PersonalizationError::Domain(_))));
    }
}
