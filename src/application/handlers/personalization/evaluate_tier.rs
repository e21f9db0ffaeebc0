//! EvaluateTierHandler - re-evaluates a user's tier after new signals.
//!
//! Fired after each journey completion (request-driven, no scheduler).
//! Tier 2 promotion applies directly when earned; Tier 3 is only reported
//! as eligible here, the promotion itself rides on training completion.

use std::sync::Arc;

use tracing::info;

use crate::config::PersonalizationConfig;
use crate::domain::foundation::{CommandMetadata, EventId, SerializableDomainEvent, Timestamp, UserId};
use crate::domain::personalization::{PersonalizationState, PersonalizationTier};
use crate::domain::signals::SignalSummary;
use crate::ports::{EventPublisher, PersonalizationStore, SignalStore, UserRepository};

use super::{tier2_eligible, tier3_eligible, PersonalizationError, TierPromotedEvent};
use crate::application::locks::UserLocks;

/// Command to evaluate a user's tier.
#[derive(Debug, Clone)]
pub struct EvaluateTierCommand {
    pub user_id: UserId,
}

/// What the evaluation found.
#[derive(Debug, Clone)]
pub struct TierEvaluation {
    pub tier: PersonalizationTier,
    pub summary: SignalSummary,
    pub tier2_eligible: bool,
    pub tier3_eligible: bool,
    /// True when this evaluation promoted the user to Tier 2.
    pub promoted: bool,
}

/// Handler for tier evaluation.
pub struct EvaluateTierHandler {
    user_repository: Arc<dyn UserRepository>,
    signal_store: Arc<dyn SignalStore>,
    personalization_store: Arc<dyn PersonalizationStore>,
    event_publisher: Arc<dyn EventPublisher>,
    locks: Arc<UserLocks>,
    thresholds: PersonalizationConfig,
}

impl EvaluateTierHandler {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        signal_store: Arc<dyn SignalStore>,
        personalization_store: Arc<dyn PersonalizationStore>,
        event_publisher: Arc<dyn EventPublisher>,
        locks: Arc<UserLocks>,
        thresholds: PersonalizationConfig,
    ) -> Self {
        Self {
            user_repository,
            signal_store,
            personalization_store,
            event_publisher,
            locks,
            thresholds,
        }
    }

    pub async fn handle(
        &self,
        cmd: EvaluateTierCommand,
        metadata: CommandMetadata,
    ) -> Result<TierEvaluation, PersonalizationError> {
        if !self.user_repository.exists(&cmd.user_id).await? {
            return Err(PersonalizationError::UnknownUser(cmd.user_id));
        }

        // Serialize against training handlers for the same user.
        let _guard = self.locks.acquire(&cmd.user_id).await;

        let summary = self.signal_store.summarize(&cmd.user_id).await?;

        let mut state = self
            .personalization_store
            .load(&cmd.user_id)
            .await?
            .unwrap_or_else(|| PersonalizationState::new(cmd.user_id.clone()));

        let tier2 = tier2_eligible(&summary, &self.thresholds);
        let tier3 = tier3_eligible(&summary, &self.thresholds);

        let mut promoted = false;
        if state.tier() == PersonalizationTier::Baseline && tier2 {
            state.promote_to(PersonalizationTier::Adaptive)?;
            self.personalization_store.save(&state).await?;
            promoted = true;

            info!(user_id = %cmd.user_id, "promoted to Adaptive tier");

            let event = TierPromotedEvent {
                event_id: EventId::new(),
                user_id: cmd.user_id.clone(),
                tier: PersonalizationTier::Adaptive,
                promoted_at: Timestamp::now(),
            };
            let envelope = event
                .to_envelope()
                .with_correlation_id(metadata.correlation_id())
                .with_user_id(metadata.user_id.to_string());
            self.event_publisher.publish(envelope).await?;
        } else if self
            .personalization_store
            .load(&cmd.user_id)
            .await?
            .is_none()
        {
            // First evaluation for this user; persist the baseline state.
            self.personalization_store.save(&state).await?;
        }

        Ok(TierEvaluation {
            tier: state.tier(),
            summary,
            tier2_eligible: tier2,
            tier3_eligible: tier3,
            promoted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        InMemoryEventBus, InMemoryPersonalizationStore, InMemorySignalStore,
        InMemoryUserRepository,
    };
    use crate::domain::foundation::CopingStyle;
    use crate::domain::signals::{SignalEvent, SignalKind};
    use crate::domain::user::{UserProfile, VisualPreferences};
    use crate::ports::SignalStore as _;

    fn test_user() -> UserId {
        UserId::new("test-user-123").unwrap()
    }

    struct Fixture {
        handler: EvaluateTierHandler,
        signals: Arc<InMemorySignalStore>,
        store: Arc<InMemoryPersonalizationStore>,
        bus: Arc<InMemoryEventBus>,
    }

    fn fixture() -> Fixture {
        let signals = Arc::new(InMemorySignalStore::new());
        let store = Arc::new(InMemoryPersonalizationStore::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let users = Arc::new(InMemoryUserRepository::with_profile(UserProfile::new(
            test_user(),
            CopingStyle::Balanced,
            VisualPreferences::default(),
        )));
        let handler = EvaluateTierHandler::new(
            users,
            Arc::clone(&signals) as Arc<dyn SignalStore>,
            Arc::clone(&store) as Arc<dyn PersonalizationStore>,
            Arc::clone(&bus) as Arc<dyn EventPublisher>,
            Arc::new(UserLocks::new()),
            PersonalizationConfig::default(),
        );
        Fixture {
            handler,
            signals,
            store,
            bus,
        }
    }

    async fn seed_signals(f: &Fixture, reactions: u64, completed: u64) {
        for _ in 0..reactions {
            f.signals
                .append(SignalEvent::new(test_user(), SignalKind::PositiveReaction))
                .await
                .unwrap();
        }
        for _ in 0..completed {
            f.signals
                .append(SignalEvent::new(test_user(), SignalKind::JourneyCompleted))
                .await
                .unwrap();
        }
    }

    fn command() -> EvaluateTierCommand {
        EvaluateTierCommand {
            user_id: test_user(),
        }
    }

    #[tokio::test]
    async fn fresh_user_stays_baseline() {
        let f = fixture();
        let eval = f
            .handler
            .handle(command(), CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert_eq!(eval.tier, PersonalizationTier::Baseline);
        assert!(!eval.tier2_eligible);
        assert!(!eval.tier3_eligible);
        assert!(!eval.promoted);

        // Baseline state was persisted for later operations.
        assert!(f.store.load(&test_user()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn sustained_engagement_earns_adaptive() {
        let f = fixture();
        // 5 completions + 5 reactions = engagement 10, completions 5.
        seed_signals(&f, 5, 5).await;

        let eval = f
            .handler
            .handle(command(), CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert_eq!(eval.tier, PersonalizationTier::Adaptive);
        assert!(eval.promoted);
        assert!(f.bus.has_event("personalization.tier_promoted.v1"));
    }

    #[tokio::test]
    async fn promotion_happens_once() {
        let f = fixture();
        seed_signals(&f, 5, 5).await;

        f.handler
            .handle(command(), CommandMetadata::test_fixture())
            .await
            .unwrap();
        let second = f
            .handler
            .handle(command(), CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert_eq!(second.tier, PersonalizationTier::Adaptive);
        assert!(!second.promoted);
        assert_eq!(f.bus.events_of_type("personalization.tier_promoted.v1").len(), 1);
    }

    #[tokio::test]
    async fn fifty_reactions_and_thirty_completions_reach_tier3_eligibility() {
        let f = fixture();
        seed_signals(&f, 50, 30).await;

        let eval = f
            .handler
            .handle(command(), CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert!(eval.tier3_eligible);
        // Evaluation alone never sets FineTuned.
        assert_ne!(eval.tier, PersonalizationTier::FineTuned);
    }

    #[tokio::test]
    async fn unknown_user_is_rejected() {
        let f = fixture();
        let result = f
            .handler
            .handle(
                EvaluateTierCommand {
                    user_id: UserId::new("ghost").unwrap(),
                },
                CommandMetadata::test_fixture(),
            )
            .await;
        assert!(matches!(result, Err(PersonalizationError::UnknownUser(_))));
    }

    #[tokio::test]
    async fn evaluation_is_reproducible_from_the_log() {
        let f = fixture();
        seed_signals(&f, 7, 3).await;

        let first = f
            .handler
            .handle(command(), CommandMetadata::test_fixture())
            .await
            .unwrap();
        let second = f
            .handler
            .handle(command(), CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert_eq!(first.summary, second.summary);
        assert_eq!(first.tier2_eligible, second.tier2_eligible);
    }
}
