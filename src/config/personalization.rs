//! Tier promotion threshold configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Thresholds the personalization engine evaluates against.
///
/// Policy (when to promote) lives here; mechanism (how training runs)
/// stays in the engine, so thresholds are tunable without touching
/// state-machine code.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonalizationConfig {
    /// Completed journeys required before Tier 2.
    #[serde(default = "default_tier2_min_completed")]
    pub tier2_min_completed_journeys: u64,

    /// Engagement score floor sustained before Tier 2.
    #[serde(default = "default_tier2_engagement_floor")]
    pub tier2_engagement_floor: u64,

    /// Positive reactions required before Tier 3.
    #[serde(default = "default_tier3_min_reactions")]
    pub tier3_min_positive_reactions: u64,

    /// Completed journeys required before Tier 3.
    #[serde(default = "default_tier3_min_completed")]
    pub tier3_min_completed_journeys: u64,
}

impl PersonalizationConfig {
    /// Validate threshold configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.tier2_min_completed_journeys == 0
            || self.tier3_min_positive_reactions == 0
            || self.tier3_min_completed_journeys == 0
        {
            return Err(ValidationError::InvalidTierThresholds);
        }
        if self.tier2_min_completed_journeys > self.tier3_min_completed_journeys {
            return Err(ValidationError::TierThresholdsOutOfOrder);
        }
        Ok(())
    }
}

impl Default for PersonalizationConfig {
    fn default() -> Self {
        Self {
            tier2_min_completed_journeys: default_tier2_min_completed(),
            tier2_engagement_floor: default_tier2_engagement_floor(),
            tier3_min_positive_reactions: default_tier3_min_reactions(),
            tier3_min_completed_journeys: default_tier3_min_completed(),
        }
    }
}

fn default_tier2_min_completed() -> u64 {
    5
}

fn default_tier2_engagement_floor() -> u64 {
    10
}

fn default_tier3_min_reactions() -> u64 {
    50
}

fn default_tier3_min_completed() -> u64 {
    30
}
