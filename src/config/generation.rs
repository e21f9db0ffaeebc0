//! Generation capability configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Timeouts, retry budgets, and backoff for the generation capabilities.
///
/// The retry constants are deliberately configuration rather than code:
/// the right budget depends on the deployed backends.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Per-call deadline in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Automatic regeneration attempts per advance call after a safety
    /// rejection.
    #[serde(default = "default_regeneration_attempts")]
    pub max_regeneration_attempts: u32,

    /// Total regeneration attempts allowed per journey before
    /// `GenerationUnavailable` is surfaced.
    #[serde(default = "default_regeneration_budget")]
    pub regeneration_budget: u32,

    /// Fixed delay between regeneration attempts, in milliseconds.
    #[serde(default = "default_regeneration_backoff_ms")]
    pub regeneration_backoff_ms: u64,

    /// Retries for transient capability failures within one attempt.
    #[serde(default = "default_transient_retries")]
    pub max_transient_retries: u32,

    /// Base delay for the exponential transient backoff, in milliseconds.
    #[serde(default = "default_transient_backoff_ms")]
    pub transient_backoff_base_ms: u64,
}

impl GenerationConfig {
    /// Per-call deadline as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Fixed regeneration backoff as a Duration.
    pub fn regeneration_backoff(&self) -> Duration {
        Duration::from_millis(self.regeneration_backoff_ms)
    }

    /// Base transient backoff as a Duration.
    pub fn transient_backoff_base(&self) -> Duration {
        Duration::from_millis(self.transient_backoff_base_ms)
    }

    /// Validate generation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.request_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_regeneration_attempts == 0 || self.regeneration_budget == 0 {
            return Err(ValidationError::InvalidRegenerationBudget);
        }
        if self.max_regeneration_attempts > self.regeneration_budget {
            return Err(ValidationError::RegenerationAttemptsExceedBudget);
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_timeout(),
            max_regeneration_attempts: default_regeneration_attempts(),
            regeneration_budget: default_regeneration_budget(),
            regeneration_backoff_ms: default_regeneration_backoff_ms(),
            max_transient_retries: default_transient_retries(),
            transient_backoff_base_ms: default_transient_backoff_ms(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_regeneration_attempts() -> u32 {
    2
}

fn default_regeneration_budget() -> u32 {
    6
}

fn default_regeneration_backoff_ms() -> u64 {
    500
}

fn default_transient_retries() -> u32 {
    3
}

fn default_transient_backoff_ms() -> u64 {
    200
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = GenerationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.regeneration_backoff(), Duration::from_millis(500));
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let config = GenerationConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidTimeout)
        ));
    }

    #[test]
    fn per_call_attempts_cannot_exceed_budget() {
        let config = GenerationConfig {
            max_regeneration_attempts: 10,
            regeneration_budget: 4,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::RegenerationAttemptsExceedBudget)
        ));
    }

    #[test]
    fn zero_attempts_fail_validation() {
        let config = GenerationConfig {
            max_regeneration_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
