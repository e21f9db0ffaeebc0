//! Coping style classification.

use serde::{Deserialize, Serialize};

/// How a user tends to process distress.
///
/// Assessed at onboarding and used to bias prompt and curator-message
/// generation toward the register that lands for this user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopingStyle {
    /// Prefers indirect, metaphor-heavy framing.
    Avoidant,
    /// Prefers direct naming of the emotion.
    Confrontive,
    /// No strong preference either way.
    #[default]
    Balanced,
}

impl CopingStyle {
    /// Returns the display name for this style.
    pub fn display_name(&self) -> &'static str {
        match self {
            CopingStyle::Avoidant => "Avoidant",
            CopingStyle::Confrontive => "Confrontive",
            CopingStyle::Balanced => "Balanced",
        }
    }
}

impl std::fmt::Display for CopingStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
