//! Journey stage lifecycle.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// The four stages a diary entry moves through.
///
/// Strictly forward: no stage may be skipped or revisited, and `Closure`
/// is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JourneyStage {
    /// The diary entry has been captured together with its VAD score.
    Moment,
    /// A prompt and image have been generated and approved.
    Reflection,
    /// The user has signed the guestbook (titled and named the feeling).
    Defusion,
    /// The curator message has been delivered; the journey is sealed.
    Closure,
}

impl JourneyStage {
    /// Canonical stage order.
    pub const SEQUENCE: [JourneyStage; 4] = [
        JourneyStage::Moment,
        JourneyStage::Reflection,
        JourneyStage::Defusion,
        JourneyStage::Closure,
    ];

    /// Zero-based position of this stage in the canonical order.
    pub fn position(&self) -> usize {
        match self {
            JourneyStage::Moment => 0,
            JourneyStage::Reflection => 1,
            JourneyStage::Defusion => 2,
            JourneyStage::Closure => 3,
        }
    }

    /// The stage that follows this one, if any.
    pub fn next(&self) -> Option<JourneyStage> {
        Self::SEQUENCE.get(self.position() + 1).copied()
    }

    /// Returns the display name for this stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            JourneyStage::Moment => "The Moment",
            JourneyStage::Reflection => "Reflection",
            JourneyStage::Defusion => "Defusion",
            JourneyStage::Closure => "Closure",
        }
    }
}

impl StateMachine for JourneyStage {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.next() == Some(*target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        self.next().into_iter().collect()
    }
}

impl std::fmt::Display for JourneyStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
