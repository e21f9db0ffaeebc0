//! Per-user personalization state.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, StateMachine, Timestamp, TrainingJobId, UserId,
};

use super::PersonalizationTier;

/// Record of the most recent failed training job, kept for observability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingFailure {
    pub job_id: TrainingJobId,
    pub reason: String,
    pub at: Timestamp,
}

/// What happened when a training job was closed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingOutcome {
    /// The job succeeded and the user was promoted to FineTuned.
    Promoted,
    /// The job failed; the tier is unchanged and a human must resubmit.
    Failed,
}

/// Aggregate holding one user's tier and outstanding-training bookkeeping.
///
/// Invariants: the tier only increases, and at most one training job id is
/// outstanding at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalizationState {
    user_id: UserId,
    tier: PersonalizationTier,
    outstanding_job: Option<TrainingJobId>,
    last_failure: Option<TrainingFailure>,
    updated_at: Timestamp,
}

impl PersonalizationState {
    /// Creates baseline state for a newly onboarded user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            tier: PersonalizationTier::Baseline,
            outstanding_job: None,
            last_failure: None,
            updated_at: Timestamp::now(),
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn tier(&self) -> PersonalizationTier {
        self.tier
    }

    pub fn outstanding_job(&self) -> Option<&TrainingJobId> {
        self.outstanding_job.as_ref()
    }

    pub fn has_outstanding_job(&self) -> bool {
        self.outstanding_job.is_some()
    }

    pub fn last_failure(&self) -> Option<&TrainingFailure> {
        self.last_failure.as_ref()
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Promotes the user, failing on any non-upward move.
    pub fn promote_to(&mut self, target: PersonalizationTier) -> Result<(), DomainError> {
        self.tier = self
            .tier
            .transition_to(target)
            .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Records a submitted training job.
    ///
    /// Fails with `TrainingAlreadyPending` if a job is already outstanding;
    /// the caller treats that as an idempotent no-op.
    pub fn begin_training(&mut self, job_id: TrainingJobId) -> Result<(), DomainError> {
        if let Some(existing) = &self.outstanding_job {
            return Err(DomainError::new(
                ErrorCode::TrainingAlreadyPending,
                format!("training job {} is already outstanding", existing),
            )
            .with_detail("user_id", self.user_id.to_string()));
        }
        self.outstanding_job = Some(job_id);
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Closes out the outstanding job.
    ///
    /// Success promotes to FineTuned; failure leaves the tier unchanged and
    /// records the failure. Either way the outstanding slot is cleared. A
    /// job id that does not match the outstanding one is rejected.
    pub fn complete_training(
        &mut self,
        job_id: &TrainingJobId,
        success: bool,
        failure_reason: Option<String>,
    ) -> Result<TrainingOutcome, DomainError> {
        match &self.outstanding_job {
            None => Err(DomainError::new(
                ErrorCode::NoOutstandingTrainingJob,
                "no training job is outstanding for this user",
            )
            .with_detail("user_id", self.user_id.to_string())),
            Some(outstanding) if outstanding != job_id => Err(DomainError::new(
                ErrorCode::NoOutstandingTrainingJob,
                format!(
                    "job {} does not match outstanding job {}",
                    job_id, outstanding
                ),
            )),
            Some(_) => {
                let job_id = self
                    .outstanding_job
                    .take()
                    .expect("outstanding job checked above");
                self.updated_at = Timestamp::now();

                if success {
                    self.tier = PersonalizationTier::FineTuned;
                    Ok(TrainingOutcome::Promoted)
                } else {
                    self.last_failure = Some(TrainingFailure {
                        job_id,
                        reason: failure_reason
                            .unwrap_or_else(|| "training failed".to_string()),
                        at: self.updated_at,
                    });
                    Ok(TrainingOutcome::Failed)
                }
            }
        }
    }
}
