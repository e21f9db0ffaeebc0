//! Generation pipeline - capability calls with retry and cost accounting.
//!
//! Wraps the generation ports so every call site gets the same behavior:
//! each attempt (success or failure) lands one `CostRecord` against the
//! owning journey, and transient failures are retried per the policy.

use std::sync::Arc;

use tracing::warn;

use crate::config::CostConfig;
use crate::domain::cost::{Capability, CostOwner, CostRecord};
use crate::domain::journey::ImageRef;
use crate::domain::personalization::StyleProfile;
use crate::ports::{
    CostLedger, GeneratedText, GenerationContext, GenerationError, ImageGenerator, TextGenerator,
};

use super::retry::RetryPolicy;

/// Shared front door to the generation capabilities.
pub struct GenerationPipeline {
    text: Arc<dyn TextGenerator>,
    image: Arc<dyn ImageGenerator>,
    cost_ledger: Arc<dyn CostLedger>,
    retry: RetryPolicy,
    costs: CostConfig,
}

impl GenerationPipeline {
    /// Creates the pipeline.
    pub fn new(
        text: Arc<dyn TextGenerator>,
        image: Arc<dyn ImageGenerator>,
        cost_ledger: Arc<dyn CostLedger>,
        retry: RetryPolicy,
        costs: CostConfig,
    ) -> Self {
        Self {
            text,
            image,
            cost_ledger,
            retry,
            costs,
        }
    }

    /// Generates text, charging `owner` once per attempt.
    pub async fn generate_text(
        &self,
        owner: &CostOwner,
        context: &GenerationContext,
    ) -> Result<GeneratedText, GenerationError> {
        let capability = Capability::TextGeneration;
        self.retry
            .call(capability, || {
                let generator = Arc::clone(&self.text);
                let charge = self.charge(owner, capability);
                let context = context.clone();
                async move {
                    charge.await;
                    generator.generate_text(&context).await
                }
            })
            .await
    }

    /// Generates an image, charging `owner` once per attempt.
    pub async fn generate_image(
        &self,
        owner: &CostOwner,
        prompt: &str,
        style: &StyleProfile,
    ) -> Result<ImageRef, GenerationError> {
        let capability = Capability::ImageGeneration;
        self.retry
            .call(capability, || {
                let generator = Arc::clone(&self.image);
                let charge = self.charge(owner, capability);
                let prompt = prompt.to_string();
                let style = style.clone();
                async move {
                    charge.await;
                    generator.generate_image(&prompt, &style).await
                }
            })
            .await
    }

    /// Records one attempt against the ledger. Ledger faults are logged,
    /// never allowed to fail the generation itself.
    fn charge(
        &self,
        owner: &CostOwner,
        capability: Capability,
    ) -> impl std::future::Future<Output = ()> + Send + 'static {
        let ledger = Arc::clone(&self.cost_ledger);
        let record = CostRecord::new(owner.clone(), capability, self.costs.unit_cost(capability));
        async move {
            if let Err(e) = ledger.record(record).await {
                warn!(capability = %capability, error = %e, "cost record failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryCostLedger, MockImageGenerator, MockTextGenerator};
    use crate::domain::cost::CostWindow;
    use crate::domain::foundation::{CopingStyle, JourneyId, VadScore};
    use crate::domain::journey::JourneyStage;
    use crate::domain::personalization::StyleWeights;
    use crate::domain::user::VisualPreferences;

    fn context() -> GenerationContext {
        GenerationContext::new(
            "entry",
            VadScore::new(0.5, 0.5, 0.5).unwrap(),
            JourneyStage::Reflection,
            CopingStyle::Balanced,
        )
    }

    fn style() -> StyleProfile {
        StyleProfile {
            preferences: VisualPreferences::default(),
            weights: StyleWeights::default(),
        }
    }

    struct Fixture {
        pipeline: GenerationPipeline,
        text: Arc<MockTextGenerator>,
        image: Arc<MockImageGenerator>,
        ledger: Arc<InMemoryCostLedger>,
    }

    fn fixture(retries: u32) -> Fixture {
        let text = Arc::new(MockTextGenerator::new());
        let image = Arc::new(MockImageGenerator::new());
        let ledger = Arc::new(InMemoryCostLedger::new());
        let pipeline = GenerationPipeline::new(
            Arc::clone(&text) as Arc<dyn TextGenerator>,
            Arc::clone(&image) as Arc<dyn ImageGenerator>,
            Arc::clone(&ledger) as Arc<dyn CostLedger>,
            RetryPolicy::immediate(retries),
            CostConfig::default(),
        );
        Fixture {
            pipeline,
            text,
            image,
            ledger,
        }
    }

    #[tokio::test]
    async fn successful_call_charges_once() {
        let f = fixture(3);
        let owner = CostOwner::Journey(JourneyId::new());

        f.pipeline.generate_text(&owner, &context()).await.unwrap();

        assert_eq!(f.ledger.total(&owner, &CostWindow::all()).await.unwrap(), 2);
        assert_eq!(f.text.call_count(), 1);
    }

    #[tokio::test]
    async fn each_retry_attempt_is_charged() {
        let f = fixture(3);
        let owner = CostOwner::Journey(JourneyId::new());

        f.text.enqueue_error(GenerationError::unavailable("down"));
        f.text.enqueue_error(GenerationError::network("reset"));
        // Third attempt uses the canned success.

        f.pipeline.generate_text(&owner, &context()).await.unwrap();

        assert_eq!(f.text.call_count(), 3);
        assert_eq!(f.ledger.total(&owner, &CostWindow::all()).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn failed_attempts_are_still_charged() {
        let f = fixture(0);
        let owner = CostOwner::Journey(JourneyId::new());

        f.image.enqueue_error(GenerationError::unavailable("down"));
        let result = f.pipeline.generate_image(&owner, "prompt", &style()).await;

        assert!(result.is_err());
        assert_eq!(f.ledger.total(&owner, &CostWindow::all()).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn image_charges_image_rate() {
        let f = fixture(0);
        let owner = CostOwner::Journey(JourneyId::new());

        f.pipeline
            .generate_image(&owner, "prompt", &style())
            .await
            .unwrap();

        let records = f.ledger.records_for_owner(&owner).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].capability, Capability::ImageGeneration);
        assert_eq!(records[0].unit_cost_cents, 10);
    }
}
