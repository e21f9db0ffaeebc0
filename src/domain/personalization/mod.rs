//! Personalization module - the 3-tier state machine and adaptive weights.

mod adaptive;
mod state;
mod tier;

pub use adaptive::{StyleProfile, StyleWeights};
pub use state::{PersonalizationState, TrainingFailure, TrainingOutcome};
pub use tier::PersonalizationTier;
