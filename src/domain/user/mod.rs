//! User module - profiles, coping styles, and visual preferences.

mod profile;

pub use profile::{ArtStyle, Complexity, Palette, UserProfile, VisualPreferences};
