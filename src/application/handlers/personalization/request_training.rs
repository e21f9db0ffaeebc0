//! RequestTrainingHandler - submits a fine-tuning job for a Tier-3-eligible
//! user, at most one in flight per user.
//!
//! The at-most-one invariant lives here, not in the external trainer: the
//! per-user lock makes the read-evaluate-write of the outstanding-job
//! field atomic, so concurrent requests collapse into one submission and
//! the rest observe it as an idempotent no-op.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{CostConfig, PersonalizationConfig};
use crate::domain::cost::{Capability, CostOwner, CostRecord};
use crate::domain::foundation::{
    domain_event, CommandMetadata, EventId, SerializableDomainEvent, Timestamp, TrainingJobId,
    UserId,
};
use crate::domain::personalization::PersonalizationState;
use crate::ports::{
    CostLedger, DatasetRef, EventPublisher, PersonalizationStore, SignalStore, TrainingError,
    TrainingService, UserRepository,
};

use super::{tier3_eligible, PersonalizationError};
use crate::application::locks::UserLocks;

/// Command to maybe submit a training job.
#[derive(Debug, Clone)]
pub struct RequestTrainingCommand {
    pub user_id: UserId,
}

/// What happened to the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrainingRequestOutcome {
    /// A job was submitted and recorded.
    Submitted(TrainingJobId),
    /// A job is already outstanding; nothing was submitted.
    AlreadyPending(TrainingJobId),
    /// The user has not crossed the Tier 3 thresholds.
    NotEligible,
}

/// Event published when a training job is submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRequestedEvent {
    pub event_id: EventId,
    pub user_id: UserId,
    pub job_id: TrainingJobId,
    pub requested_at: Timestamp,
}

domain_event!(
    TrainingRequestedEvent,
    event_type = "personalization.training_requested.v1",
    schema_version = 1,
    aggregate_id = user_id,
    aggregate_type = "Personalization",
    occurred_at = requested_at,
    event_id = event_id
);

/// Handler for training requests.
pub struct RequestTrainingHandler {
    user_repository: Arc<dyn UserRepository>,
    signal_store: Arc<dyn SignalStore>,
    personalization_store: Arc<dyn PersonalizationStore>,
    trainer: Arc<dyn TrainingService>,
    cost_ledger: Arc<dyn CostLedger>,
    event_publisher: Arc<dyn EventPublisher>,
    locks: Arc<UserLocks>,
    thresholds: PersonalizationConfig,
    costs: CostConfig,
}

impl RequestTrainingHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        signal_store: Arc<dyn SignalStore>,
        personalization_store: Arc<dyn PersonalizationStore>,
        trainer: Arc<dyn TrainingService>,
        cost_ledger: Arc<dyn CostLedger>,
        event_publisher: Arc<dyn EventPublisher>,
        locks: Arc<UserLocks>,
        thresholds: PersonalizationConfig,
        costs: CostConfig,
    ) -> Self {
        Self {
            user_repository,
            signal_store,
            personalization_store,
            trainer,
            cost_ledger,
            event_publisher,
            locks,
            thresholds,
            costs,
        }
    }

    pub async fn handle(
        &self,
        cmd: RequestTrainingCommand,
        metadata: CommandMetadata,
    ) -> Result<TrainingRequestOutcome, PersonalizationError> {
        if !self.user_repository.exists(&cmd.user_id).await? {
            return Err(PersonalizationError::UnknownUser(cmd.user_id));
        }

        // Single writer for this user's outstanding-job field.
        let _guard = self.locks.acquire(&cmd.user_id).await;

        let summary = self.signal_store.summarize(&cmd.user_id).await?;
        if !tier3_eligible(&summary, &self.thresholds) {
            return Ok(TrainingRequestOutcome::NotEligible);
        }

        let mut state = self
            .personalization_store
            .load(&cmd.user_id)
            .await?
            .unwrap_or_else(|| PersonalizationState::new(cmd.user_id.clone()));

        if let Some(job_id) = state.outstanding_job() {
            return Ok(TrainingRequestOutcome::AlreadyPending(job_id.clone()));
        }

        // Submit and record, still under the lock.
        let dataset = DatasetRef::for_user(&cmd.user_id);
        let job_id = self
            .trainer
            .submit_training_job(&cmd.user_id, &dataset)
            .await
            .map_err(|e| match e {
                TrainingError::ServiceUnavailable { message } => {
                    PersonalizationError::ServiceUnavailable { message }
                }
                TrainingError::InsufficientData { reason } => {
                    PersonalizationError::InsufficientData { reason }
                }
            })?;

        state.begin_training(job_id.clone())?;
        self.personalization_store.save(&state).await?;

        if let Err(e) = self
            .cost_ledger
            .record(CostRecord::new(
                CostOwner::TrainingJob(job_id.clone()),
                Capability::Training,
                self.costs.unit_cost(Capability::Training),
            ))
            .await
        {
            warn!(user_id = %cmd.user_id, error = %e, "training cost record failed");
        }

        info!(user_id = %cmd.user_id, job_id = %job_id, "training job submitted");

        let event = TrainingRequestedEvent {
            event_id: EventId::new(),
            user_id: cmd.user_id.clone(),
            job_id: job_id.clone(),
            requested_at: Timestamp::now(),
        };
        let envelope = event
            .to_envelope()
            .with_correlation_id(metadata.correlation_id())
            .with_user_id(metadata.user_id.to_string());
        self.event_publisher.publish(envelope).await?;

        Ok(TrainingRequestOutcome::Submitted(job_id))
    }
}
