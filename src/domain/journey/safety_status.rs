//! Safety status tracked per generated or user-authored artifact.

use serde::{Deserialize, Serialize};

/// Safety verdict recorded against an artifact attached to a journey stage.
///
/// A stage is only complete once its artifact is `Approved`. `Escalated`
/// is terminal for the artifact and freezes the journey pending human
/// review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyStatus {
    /// Validation has not completed yet.
    Pending,
    /// Passed the safety gate; the artifact may be shown.
    Approved,
    /// Failed the safety gate; the artifact must be regenerated or edited.
    Rejected,
    /// Crisis content detected; frozen pending human review.
    Escalated,
}

impl SafetyStatus {
    /// True when the artifact may be shown to the user.
    pub fn is_approved(&self) -> bool {
        matches!(self, SafetyStatus::Approved)
    }

    /// True when no further automatic processing is allowed.
    pub fn is_frozen(&self) -> bool {
        matches!(self, SafetyStatus::Escalated)
    }
}
