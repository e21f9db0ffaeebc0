//! Pure fold over a user's signal log.

use serde::{Deserialize, Serialize};

use super::{SignalEvent, SignalKind};

/// Per-kind counts and the weighted engagement score for one user.
///
/// A deterministic pure function of the event log: replaying the same
/// events in the same order always yields the same summary, which is what
/// makes tier-promotion decisions auditable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSummary {
    pub positive_reactions: u64,
    pub journeys_completed: u64,
    pub messages_engaged: u64,
    /// Weighted sum over all events, no decay.
    pub engagement_score: u64,
}

impl SignalSummary {
    /// Folds a slice of events into a summary.
    pub fn from_events(events: &[SignalEvent]) -> Self {
        events.iter().fold(Self::default(), |mut acc, event| {
            match event.kind {
                SignalKind::PositiveReaction => acc.positive_reactions += 1,
                SignalKind::JourneyCompleted => acc.journeys_completed += 1,
                SignalKind::MessageEngaged => acc.messages_engaged += 1,
            }
            acc.engagement_score += u64::from(event.weight);
            acc
        })
    }

    /// Total number of folded events.
    pub fn total_events(&self) -> u64 {
        self.positive_reactions + self.journeys_completed + self.messages_engaged
    }
}
