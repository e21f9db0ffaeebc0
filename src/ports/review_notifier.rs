//! ReviewNotifier port - fire-and-forget channel to the human-review team.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{JourneyId, Timestamp, UserId};
use crate::domain::journey::JourneyStage;
use crate::domain::safety::{ContentKind, RejectionCategory};

/// Everything a reviewer needs to triage an escalation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationRecord {
    pub journey_id: JourneyId,
    pub user_id: UserId,
    /// The stage the frozen artifact was destined for.
    pub destined_stage: JourneyStage,
    pub kind: ContentKind,
    pub category: RejectionCategory,
    /// Short excerpt of the flagged content for reviewer context.
    pub excerpt: String,
    pub occurred_at: Timestamp,
}

/// Delivery failure; only ever logged, never surfaced to the gate's caller.
#[derive(Debug, Clone, thiserror::Error)]
#[error("review notification failed: {message}")]
pub struct NotifyError {
    pub message: String,
}

impl NotifyError {
    /// Creates a notify error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Port for notifying the human-review collaborator about escalations.
///
/// Fire-and-forget: the safety gate spawns the call and never waits on it.
/// The escalation itself is recorded on the journey before any notification
/// attempt, so a lost notification never loses the escalation.
#[async_trait]
pub trait ReviewNotifier: Send + Sync {
    /// Delivers one escalation record.
    async fn notify_human_review(&self, record: EscalationRecord) -> Result<(), NotifyError>;
}
