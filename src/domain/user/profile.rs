//! User profile - identity, coping style, and visual preferences.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CopingStyle, Timestamp, UserId};

/// Preferred art style for generated imagery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtStyle {
    #[default]
    Painterly,
    Photographic,
    Abstract,
    Sketch,
}

/// Preferred color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    Warm,
    Cool,
    #[default]
    Muted,
    Vivid,
}

/// Preferred visual complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Minimal,
    #[default]
    Moderate,
    Rich,
}

impl Complexity {
    /// Base bias for the adaptive weight derivation.
    pub fn base_bias(&self) -> f64 {
        match self {
            Complexity::Minimal => 0.3,
            Complexity::Moderate => 0.5,
            Complexity::Rich => 0.8,
        }
    }
}

/// The visual-preference profile captured at onboarding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualPreferences {
    pub style: ArtStyle,
    pub palette: Palette,
    pub complexity: Complexity,
}

/// One user of the gallery.
///
/// Users are never deleted; leaving the service archives the profile so
/// that the gallery history stays attributable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    user_id: UserId,
    coping_style: CopingStyle,
    visual_preferences: VisualPreferences,
    archived: bool,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl UserProfile {
    /// Creates a profile at onboarding.
    pub fn new(
        user_id: UserId,
        coping_style: CopingStyle,
        visual_preferences: VisualPreferences,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            user_id,
            coping_style,
            visual_preferences,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn coping_style(&self) -> CopingStyle {
        self.coping_style
    }

    pub fn visual_preferences(&self) -> &VisualPreferences {
        &self.visual_preferences
    }

    pub fn is_archived(&self) -> bool {
        self.archived
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Updates the coping style after a re-assessment.
    pub fn set_coping_style(&mut self, style: CopingStyle) {
        self.coping_style = style;
        self.updated_at = Timestamp::now();
    }

    /// Updates the visual preferences.
    pub fn set_visual_preferences(&mut self, preferences: VisualPreferences) {
        self.visual_preferences = preferences;
        self.updated_at = Timestamp::now();
    }

    /// Archives the profile instead of deleting it.
    pub fn archive(&mut self) {
        self.archived = true;
        self.updated_at = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile::new(
            UserId::new("user-1").unwrap(),
            CopingStyle::Balanced,
            VisualPreferences::default(),
        )
    }

    #[test]
    fn new_profile_is_active() {
        let p = profile();
        assert!(!p.is_archived());
        assert_eq!(p.coping_style(), CopingStyle::Balanced);
    }

    #[test]
    fn archive_marks_without_deleting_fields() {
        let mut p = profile();
        p.archive();
        assert!(p.is_archived());
        assert_eq!(p.user_id().as_str(), "user-1");
    }

    #[test]
    fn set_coping_style_updates_timestamp() {
        let mut p = profile();
        let before = p.updated_at();
        p.set_coping_style(CopingStyle::Confrontive);
        assert_eq!(p.coping_style(), CopingStyle::Confrontive);
        assert!(p.updated_at() >= before);
    }

    #[test]
    fn complexity_base_bias_is_ordered() {
        assert!(Complexity::Minimal.base_bias() < Complexity::Moderate.base_bias());
        assert!(Complexity::Moderate.base_bias() < Complexity::Rich.base_bias());
    }

    #[test]
    fn preferences_default_to_muted_painterly() {
        let prefs = VisualPreferences::default();
        assert_eq!(prefs.style, ArtStyle::Painterly);
        assert_eq!(prefs.palette, Palette::Muted);
        assert_eq!(prefs.complexity, Complexity::Moderate);
    }
}
