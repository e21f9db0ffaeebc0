//! Valence-Arousal-Dominance score value object.
//!
//! The score is computed upstream by the emotion-analysis service and
//! supplied to the core as input; the core only validates and carries it.

use serde::{Deserialize, Serialize};

use super::ValidationError;

const VAD_MIN: f64 = 0.0;
const VAD_MAX: f64 = 1.0;

/// A Valence-Arousal-Dominance emotional descriptor.
///
/// Each component is normalized to [0.0, 1.0]. Construction fails if any
/// component falls outside that range, so a held `VadScore` is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VadScore {
    valence: f64,
    arousal: f64,
    dominance: f64,
}

impl VadScore {
    /// Creates a validated VAD score.
    pub fn new(valence: f64, arousal: f64, dominance: f64) -> Result<Self, ValidationError> {
        Self::check_component("valence", valence)?;
        Self::check_component("arousal", arousal)?;
        Self::check_component("dominance", dominance)?;
        Ok(Self {
            valence,
            arousal,
            dominance,
        })
    }

    fn check_component(field: &'static str, value: f64) -> Result<(), ValidationError> {
        if !value.is_finite() || !(VAD_MIN..=VAD_MAX).contains(&value) {
            return Err(ValidationError::out_of_range(field, VAD_MIN, VAD_MAX, value));
        }
        Ok(())
    }

    /// Returns the valence component (unpleasant 0.0 .. pleasant 1.0).
    pub fn valence(&self) -> f64 {
        self.valence
    }

    /// Returns the arousal component (calm 0.0 .. activated 1.0).
    pub fn arousal(&self) -> f64 {
        self.arousal
    }

    /// Returns the dominance component (overwhelmed 0.0 .. in control 1.0).
    pub fn dominance(&self) -> f64 {
        self.dominance
    }

    /// True when the entry reads as distressed (low valence, high arousal).
    ///
    /// Used to bias prompt generation toward gentler imagery.
    pub fn is_distressed(&self) -> bool {
        self.valence < 0.35 && self.arousal > 0.6
    }
}
