//! Logging review notifier - records escalations in the structured log.
//!
//! Fallback adapter for tests and local runs where no review webhook is
//! configured. The escalation is already persisted on the journey; this
//! adapter just makes it visible to operators.

use async_trait::async_trait;
use tracing::warn;

use crate::ports::{EscalationRecord, NotifyError, ReviewNotifier};

/// `ReviewNotifier` that emits a structured warning log per escalation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingReviewNotifier;

impl LoggingReviewNotifier {
    /// Creates the notifier.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReviewNotifier for LoggingReviewNotifier {
    async fn notify_human_review(&self, record: EscalationRecord) -> Result<(), NotifyError> {
        warn!(
            journey_id = %record.journey_id,
            user_id = %record.user_id,
            destined_stage = %record.destined_stage,
            kind = %record.kind,
            category = %record.category,
            "ESCALATION requires human review"
        );
        Ok(())
    }
}
