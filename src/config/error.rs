//! Configuration error types

use thiserror::Error;

use crate::domain::safety::RuleSetError;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Generation timeout must be greater than zero")]
    InvalidTimeout,

    #[error("Regeneration attempt budget must be at least 1")]
    InvalidRegenerationBudget,

    #[error("Per-call regeneration attempts cannot exceed the total budget")]
    RegenerationAttemptsExceedBudget,

    #[error("Tier promotion thresholds must be greater than zero")]
    InvalidTierThresholds,

    #[error("Tier 2 completion threshold cannot exceed the tier 3 threshold")]
    TierThresholdsOutOfOrder,

    #[error("Safety rule configuration invalid: {0}")]
    InvalidSafetyRules(#[from] RuleSetError),
}
