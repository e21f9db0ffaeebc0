//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `EMOSEUM` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use emoseum_core::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod cost;
mod error;
mod generation;
mod personalization;
mod safety;

pub use cost::CostConfig;
pub use error::{ConfigError, ValidationError};
pub use generation::GenerationConfig;
pub use personalization::PersonalizationConfig;
pub use safety::SafetyConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has workable defaults, so a bare environment loads; an
/// invalid override is fatal at startup rather than per-request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Generation timeouts, retry budgets, backoff
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Tier promotion thresholds
    #[serde(default)]
    pub personalization: PersonalizationConfig,

    /// Safety rule set source
    #[serde(default)]
    pub safety: SafetyConfig,

    /// Per-capability unit costs
    #[serde(default)]
    pub cost: CostConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `EMOSEUM` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `EMOSEUM__GENERATION__REQUEST_TIMEOUT_SECS=45`
    /// - `EMOSEUM__PERSONALIZATION__TIER3_MIN_POSITIVE_REACTIONS=50`
    /// - `EMOSEUM__SAFETY__RULES_PATH=config/safety_rules.yaml`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("EMOSEUM")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.generation.validate()?;
        self.personalization.validate()?;
        self.safety.validate()?;
        Ok(())
    }
}
