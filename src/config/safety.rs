//! Safety gate configuration

use serde::Deserialize;

use crate::domain::safety::RuleSet;

use super::error::ValidationError;

/// Where the safety gate's rule set comes from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SafetyConfig {
    /// Optional path to a YAML rule file; the built-in rules are used when
    /// absent.
    pub rules_path: Option<String>,

    /// Optional base URL of the human-review webhook; escalations are only
    /// logged when absent.
    pub review_webhook_url: Option<String>,
}

impl SafetyConfig {
    /// Loads and validates the configured rule set.
    ///
    /// Invalid rule configuration is fatal at startup, never per-request.
    pub fn load_rules(&self) -> Result<RuleSet, ValidationError> {
        match &self.rules_path {
            Some(path) => Ok(RuleSet::from_yaml_file(path)?),
            None => Ok(RuleSet::builtin()),
        }
    }

    /// Validate safety configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        // Loading performs full rule validation.
        self.load_rules().map(|_| ())
    }
}
