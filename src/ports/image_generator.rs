//! ImageGenerator port - interface for the external image-generation capability.

use async_trait::async_trait;

use crate::domain::journey::ImageRef;
use crate::domain::personalization::StyleProfile;

use super::GenerationError;

/// Port for the image-generation capability.
///
/// The capability stores the rendered image itself and returns only a
/// reference; the core never handles image bytes.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Renders an image for an approved prompt, styled for the user.
    async fn generate_image(
        &self,
        prompt: &str,
        style: &StyleProfile,
    ) -> Result<ImageRef, GenerationError>;
}
