//! Unit cost configuration for external capabilities

use serde::Deserialize;

use crate::domain::cost::Capability;

/// Unit costs recorded per attempted external call, in cents.
#[derive(Debug, Clone, Deserialize)]
pub struct CostConfig {
    #[serde(default = "default_text_cents")]
    pub text_generation_cents: u32,

    #[serde(default = "default_image_cents")]
    pub image_generation_cents: u32,

    #[serde(default = "default_training_cents")]
    pub training_cents: u32,
}

impl CostConfig {
    /// Unit cost for one attempted call against a capability.
    pub fn unit_cost(&self, capability: Capability) -> u32 {
        match capability {
            Capability::TextGeneration => self.text_generation_cents,
            Capability::ImageGeneration => self.image_generation_cents,
            Capability::Training => self.training_cents,
        }
    }
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            text_generation_cents: default_text_cents(),
            image_generation_cents: default_image_cents(),
            training_cents: default_training_cents(),
        }
    }
}

fn default_text_cents() -> u32 {
    2
}

fn default_image_cents() -> u32 {
    10
}

fn default_training_cents() -> u32 {
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_cost_maps_capabilities() {
        let config = CostConfig::default();
        assert_eq!(config.unit_cost(Capability::TextGeneration), 2);
        assert_eq!(config.unit_cost(Capability::ImageGeneration), 10);
        assert_eq!(config.unit_cost(Capability::Training), 500);
    }
}
