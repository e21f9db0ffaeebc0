//! Dev harness: wires the core against in-memory adapters and mock
//! generators, then walks one diary entry through all four stages.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use emoseum_core::adapters::{
    InMemoryCostLedger, InMemoryEventBus, InMemoryJourneyRepository,
    InMemoryPersonalizationStore, InMemorySignalStore, InMemoryUserRepository,
    LoggingReviewNotifier, MockImageGenerator, MockTextGenerator, WebhookReviewNotifier,
};
use emoseum_core::application::handlers::journey::{
    AdvanceToClosureCommand, AdvanceToClosureHandler, AdvanceToDefusionCommand,
    AdvanceToDefusionHandler, AdvanceToReflectionCommand, AdvanceToReflectionHandler,
    StartJourneyCommand, StartJourneyHandler,
};
use emoseum_core::application::handlers::personalization::{
    EvaluateTierCommand, EvaluateTierHandler, RequestTrainingCommand, RequestTrainingHandler,
};
use emoseum_core::application::{GenerationPipeline, JourneyLocks, RetryPolicy, UserLocks};
use emoseum_core::config::AppConfig;
use emoseum_core::domain::foundation::{CommandMetadata, CopingStyle, UserId};
use emoseum_core::domain::safety::SafetyGate;
use emoseum_core::domain::user::{UserProfile, VisualPreferences};
use emoseum_core::ports::{
    CostLedger, EventPublisher, ImageGenerator, JourneyRepository, PersonalizationStore,
    ReviewNotifier, SignalStore, TextGenerator, TrainingService, UserRepository,
};

use async_trait::async_trait;
use emoseum_core::domain::foundation::TrainingJobId;
use emoseum_core::ports::{DatasetRef, TrainingError};

/// Trainer stub for the harness; real deployments plug the training
/// pipeline in here.
struct StubTrainer;

#[async_trait]
impl TrainingService for StubTrainer {
    async fn submit_training_job(
        &self,
        user_id: &UserId,
        _dataset: &DatasetRef,
    ) -> Result<TrainingJobId, TrainingError> {
        TrainingJobId::new(format!("stub-{}", user_id))
            .map_err(|e| TrainingError::unavailable(e.to_string()))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load()?;
    config.validate()?;

    // Wiring: in-memory stores, mock generators, rule set from config.
    let journeys: Arc<dyn JourneyRepository> = Arc::new(InMemoryJourneyRepository::new());
    let users_repo = Arc::new(InMemoryUserRepository::new());
    let users: Arc<dyn UserRepository> = users_repo.clone();
    let signals: Arc<dyn SignalStore> = Arc::new(InMemorySignalStore::new());
    let costs: Arc<dyn CostLedger> = Arc::new(InMemoryCostLedger::new());
    let personalization: Arc<dyn PersonalizationStore> =
        Arc::new(InMemoryPersonalizationStore::new());
    let bus: Arc<dyn EventPublisher> = Arc::new(InMemoryEventBus::new());
    let journey_locks = Arc::new(JourneyLocks::new());
    let user_locks = Arc::new(UserLocks::new());

    let notifier: Arc<dyn ReviewNotifier> = match &config.safety.review_webhook_url {
        Some(url) => Arc::new(WebhookReviewNotifier::new(url.clone())),
        None => Arc::new(LoggingReviewNotifier::new()),
    };
    let gate = Arc::new(SafetyGate::new(config.safety.load_rules()?, notifier));

    let pipeline = Arc::new(GenerationPipeline::new(
        Arc::new(MockTextGenerator::new()) as Arc<dyn TextGenerator>,
        Arc::new(MockImageGenerator::new()) as Arc<dyn ImageGenerator>,
        Arc::clone(&costs),
        RetryPolicy::from_config(&config.generation),
        config.cost.clone(),
    ));

    let start = StartJourneyHandler::new(Arc::clone(&journeys), Arc::clone(&users), Arc::clone(&bus));
    let to_reflection = AdvanceToReflectionHandler::new(
        Arc::clone(&journeys),
        Arc::clone(&users),
        Arc::clone(&signals),
        Arc::clone(&personalization),
        Arc::clone(&gate),
        Arc::clone(&pipeline),
        Arc::clone(&bus),
        Arc::clone(&journey_locks),
        config.generation.clone(),
    );
    let to_defusion = AdvanceToDefusionHandler::new(
        Arc::clone(&journeys),
        Arc::clone(&gate),
        Arc::clone(&bus),
        Arc::clone(&journey_locks),
    );
    let to_closure = AdvanceToClosureHandler::new(
        Arc::clone(&journeys),
        Arc::clone(&signals),
        Arc::clone(&gate),
        Arc::clone(&pipeline),
        Arc::clone(&bus),
        Arc::clone(&journey_locks),
        config.generation.clone(),
    );
    let evaluate = EvaluateTierHandler::new(
        Arc::clone(&users),
        Arc::clone(&signals),
        Arc::clone(&personalization),
        Arc::clone(&bus),
        Arc::clone(&user_locks),
        config.personalization.clone(),
    );
    let request_training = RequestTrainingHandler::new(
        Arc::clone(&users),
        Arc::clone(&signals),
        Arc::clone(&personalization),
        Arc::new(StubTrainer),
        Arc::clone(&costs),
        Arc::clone(&bus),
        Arc::clone(&user_locks),
        config.personalization.clone(),
        config.cost.clone(),
    );

    // One visitor walks the full journey.
    let user_id = UserId::new("visitor-1")?;
    users_repo
        .save(&UserProfile::new(
            user_id.clone(),
            CopingStyle::Balanced,
            VisualPreferences::default(),
        ))
        .await?;
    let metadata = CommandMetadata::new(user_id.clone()).with_source("dev-harness");

    let journey = start
        .handle(
            StartJourneyCommand {
                diary_text: "today felt heavy, like carrying wet sand".to_string(),
                emotion_keywords: vec!["heavy".to_string(), "tired".to_string()],
                vad: (0.2, 0.6, 0.4),
            },
            metadata.clone(),
        )
        .await?;
    info!(journey_id = %journey.id(), "stage 1 complete: the moment is captured");

    let reflection = to_reflection
        .handle(
            AdvanceToReflectionCommand {
                journey_id: journey.id(),
                coping_style: CopingStyle::Balanced,
            },
            metadata.clone(),
        )
        .await?;
    info!(
        prompt = %reflection.journey.reflection().map(|r| r.prompt.as_str()).unwrap_or_default(),
        "stage 2 complete: reflection approved"
    );

    to_defusion
        .handle(
            AdvanceToDefusionCommand {
                journey_id: journey.id(),
                guestbook_title: "The Weight".to_string(),
                guestbook_tags: vec!["heavy".to_string()],
                guestbook_text: "I see this feeling, I don't have to fix it".to_string(),
                guided_question: None,
            },
            metadata.clone(),
        )
        .await?;
    info!("stage 3 complete: guestbook signed");

    let closure = to_closure
        .handle(
            AdvanceToClosureCommand {
                journey_id: journey.id(),
            },
            metadata.clone(),
        )
        .await?;
    info!(
        message = %closure.journey.curator_message().map(|m| m.text.as_str()).unwrap_or_default(),
        "stage 4 complete: journey sealed"
    );

    let evaluation = evaluate
        .handle(
            EvaluateTierCommand {
                user_id: user_id.clone(),
            },
            metadata.clone(),
        )
        .await?;
    info!(
        tier = %evaluation.tier,
        completed = evaluation.summary.journeys_completed,
        "tier evaluated after completion"
    );

    let training = request_training
        .handle(RequestTrainingCommand { user_id }, metadata)
        .await?;
    info!(outcome = ?training, "training request evaluated");

    Ok(())
}
