//! Personalization tier definitions.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// How much adaptation is applied to generated content for a user.
///
/// Tiers only ever increase; there is no automatic demotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonalizationTier {
    /// Generic generation parameters for every user.
    #[default]
    Baseline,
    /// Style and palette biases derived continuously from the signal log.
    Adaptive,
    /// A per-user fine-tuned model produced by a completed training job.
    FineTuned,
}

impl PersonalizationTier {
    /// Numeric rank for comparison; higher rank = more adaptation.
    pub fn rank(&self) -> u8 {
        match self {
            PersonalizationTier::Baseline => 1,
            PersonalizationTier::Adaptive => 2,
            PersonalizationTier::FineTuned => 3,
        }
    }

    /// Returns the display name for this tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            PersonalizationTier::Baseline => "Baseline",
            PersonalizationTier::Adaptive => "Adaptive",
            PersonalizationTier::FineTuned => "Fine-tuned",
        }
    }
}

impl StateMachine for PersonalizationTier {
    fn can_transition_to(&self, target: &Self) -> bool {
        target.rank() > self.rank()
    }

    fn valid_transitions(&self) -> Vec<Self> {
        [
            PersonalizationTier::Adaptive,
            PersonalizationTier::FineTuned,
        ]
        .into_iter()
        .filter(|t| self.can_transition_to(t))
        .collect()
    }
}

impl std::fmt::Display for PersonalizationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_order_the_tiers() {
        assert!(PersonalizationTier::Baseline.rank() < PersonalizationTier::Adaptive.rank());
        assert!(PersonalizationTier::Adaptive.rank() < PersonalizationTier::FineTuned.rank());
    }

    #[test]
    fn only_upward_transitions_are_valid() {
        assert!(PersonalizationTier::Baseline.can_transition_to(&PersonalizationTier::Adaptive));
        assert!(PersonalizationTier::Baseline.can_transition_to(&PersonalizationTier::FineTuned));
        assert!(PersonalizationTier::Adaptive.can_transition_to(&PersonalizationTier::FineTuned));

        assert!(!PersonalizationTier::Adaptive.can_transition_to(&PersonalizationTier::Baseline));
        assert!(!PersonalizationTier::FineTuned.can_transition_to(&PersonalizationTier::Adaptive));
        assert!(!PersonalizationTier::Baseline.can_transition_to(&PersonalizationTier::Baseline));
    }

    #[test]
    fn fine_tuned_is_terminal() {
        assert!(PersonalizationTier::FineTuned.is_terminal());
    }

    #[test]
    fn default_is_baseline() {
        assert_eq!(PersonalizationTier::default(), PersonalizationTier::Baseline);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PersonalizationTier::FineTuned).unwrap(),
            "\"finetuned\""
        );
    }
}
