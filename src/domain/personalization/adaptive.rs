//! Tier-2 adaptive generation parameters.
//!
//! Adaptive behavior is a continuous reweighting derived from the signal
//! log on every read. Nothing here is persisted: the summarized signals are
//! the only input, so the weights are always reproducible.

use serde::{Deserialize, Serialize};

use crate::domain::signals::SignalSummary;
use crate::domain::user::VisualPreferences;

use super::PersonalizationTier;

/// Style biases applied to image generation, all in [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleWeights {
    /// How strongly to lean into the user's preferred palette.
    pub palette_bias: f64,
    /// How much visual complexity to request.
    pub complexity_bias: f64,
    /// How tightly the image should follow the generated prompt.
    pub prompt_adherence: f64,
}

impl Default for StyleWeights {
    fn default() -> Self {
        Self {
            palette_bias: 0.5,
            complexity_bias: 0.5,
            prompt_adherence: 0.5,
        }
    }
}

impl StyleWeights {
    /// Derives weights from the user's accumulated signals.
    ///
    /// More positive reactions pull the palette bias toward the stated
    /// preference; sustained engagement earns more complexity. Weights
    /// saturate instead of growing without bound.
    pub fn derive(summary: &SignalSummary, preferences: &VisualPreferences) -> Self {
        let reaction_factor = saturate(summary.positive_reactions as f64 / 20.0);
        let engagement_factor = saturate(summary.engagement_score as f64 / 50.0);

        Self {
            palette_bias: 0.5 + 0.5 * reaction_factor,
            complexity_bias: preferences.complexity.base_bias() * (0.6 + 0.4 * engagement_factor),
            prompt_adherence: 0.5 + 0.3 * engagement_factor,
        }
    }
}

/// Everything the image capability needs to style a generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleProfile {
    pub preferences: VisualPreferences,
    pub weights: StyleWeights,
}

impl StyleProfile {
    /// Builds the profile a generation call should use for this user.
    ///
    /// Baseline users get default weights; Adaptive and above get weights
    /// recomputed from the current signal summary.
    pub fn for_tier(
        tier: PersonalizationTier,
        summary: &SignalSummary,
        preferences: &VisualPreferences,
    ) -> Self {
        let weights = match tier {
            PersonalizationTier::Baseline => StyleWeights::default(),
            PersonalizationTier::Adaptive | PersonalizationTier::FineTuned => {
                StyleWeights::derive(summary, preferences)
            }
        };
        Self {
            preferences: preferences.clone(),
            weights,
        }
    }
}

fn saturate(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
