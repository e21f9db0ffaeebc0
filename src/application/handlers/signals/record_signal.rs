//! RecordSignalHandler - the single writer to the signal ledger.

use std::sync::Arc;

use tracing::debug;

use crate::domain::foundation::{SignalEventId, UserId, ValidationError};
use crate::domain::signals::{ReactionSentiment, SignalEvent, SignalKind};
use crate::ports::{SignalStore, UserRepository};

use super::super::personalization::PersonalizationError;

/// Command to append one signal.
#[derive(Debug, Clone)]
pub struct RecordSignalCommand {
    pub user_id: UserId,
    pub kind: SignalKind,
    /// Defaults to 1 when absent.
    pub weight: Option<u32>,
    /// Present for reaction-driven signals; must agree with `kind`.
    pub sentiment: Option<ReactionSentiment>,
}

impl RecordSignalCommand {
    /// Builds the command for a client reaction label.
    pub fn from_reaction(user_id: UserId, label: &str) -> Result<Self, ValidationError> {
        let sentiment = ReactionSentiment::parse(label)?;
        Ok(Self {
            user_id,
            kind: sentiment.signal_kind(),
            weight: None,
            sentiment: Some(sentiment),
        })
    }
}

/// Error type for recording signals.
#[derive(Debug, Clone)]
pub enum RecordSignalError {
    /// No profile exists for the user.
    UnknownUser(UserId),
    /// Sentiment and kind disagree, or the weight is zero.
    InvalidInput(ValidationError),
    /// Storage-level failure.
    Domain(crate::domain::foundation::DomainError),
}

impl std::fmt::Display for RecordSignalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordSignalError::UnknownUser(id) => write!(f, "Unknown user: {}", id),
            RecordSignalError::InvalidInput(err) => write!(f, "{}", err),
            RecordSignalError::Domain(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for RecordSignalError {}

impl From<crate::domain::foundation::DomainError> for RecordSignalError {
    fn from(err: crate::domain::foundation::DomainError) -> Self {
        RecordSignalError::Domain(err)
    }
}

impl From<RecordSignalError> for PersonalizationError {
    fn from(err: RecordSignalError) -> Self {
        match err {
            RecordSignalError::UnknownUser(id) => PersonalizationError::UnknownUser(id),
            RecordSignalError::InvalidInput(e) => {
                PersonalizationError::Domain(e.into())
            }
            RecordSignalError::Domain(e) => PersonalizationError::Domain(e),
        }
    }
}

/// Handler appending signals to the ledger.
pub struct RecordSignalHandler {
    user_repository: Arc<dyn UserRepository>,
    signal_store: Arc<dyn SignalStore>,
}

impl RecordSignalHandler {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        signal_store: Arc<dyn SignalStore>,
    ) -> Self {
        Self {
            user_repository,
            signal_store,
        }
    }

    pub async fn handle(
        &self,
        cmd: RecordSignalCommand,
    ) -> Result<SignalEventId, RecordSignalError> {
        if let Some(sentiment) = cmd.sentiment {
            if sentiment.signal_kind() != cmd.kind {
                return Err(RecordSignalError::InvalidInput(
                    ValidationError::invalid_format(
                        "sentiment",
                        format!("{:?} does not record a {:?} signal", sentiment, cmd.kind),
                    ),
                ));
            }
        }
        if cmd.weight == Some(0) {
            return Err(RecordSignalError::InvalidInput(
                ValidationError::invalid_format("weight", "weight must be at least 1"),
            ));
        }

        if !self.user_repository.exists(&cmd.user_id).await? {
            return Err(RecordSignalError::UnknownUser(cmd.user_id));
        }

        let mut event = match cmd.sentiment {
            Some(sentiment) => SignalEvent::from_reaction(cmd.user_id.clone(), sentiment),
            None => SignalEvent::new(cmd.user_id.clone(), cmd.kind),
        };
        if let Some(weight) = cmd.weight {
            event = event.with_weight(weight);
        }

        let event_id = event.id;
        self.signal_store.append(event).await?;

        debug!(user_id = %cmd.user_id, kind = ?cmd.kind, "signal recorded");
        Ok(event_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemorySignalStore, InMemoryUserRepository};
    use crate::domain::foundation::CopingStyle;
    use crate::domain::signals::SignalSummary;
    use crate::domain::user::{UserProfile, VisualPreferences};

    fn test_user() -> UserId {
        UserId::new("test-user-123").unwrap()
    }

    fn fixture() -> (RecordSignalHandler, Arc<InMemorySignalStore>) {
        let signals = Arc::new(InMemorySignalStore::new());
        let users = Arc::new(InMemoryUserRepository::with_profile(UserProfile::new(
            test_user(),
            CopingStyle::Balanced,
            VisualPreferences::default(),
        )));
        (
            RecordSignalHandler::new(users, Arc::clone(&signals) as Arc<dyn SignalStore>),
            signals,
        )
    }

    #[tokio::test]
    async fn appends_reaction_signal() {
        let (handler, signals) = fixture();

        let cmd = RecordSignalCommand::from_reaction(test_user(), "touched").unwrap();
        handler.handle(cmd).await.unwrap();

        let events = signals.events_for_user(&test_user()).await.unwrap();
        let summary = SignalSummary::from_events(&events);
        assert_eq!(summary.positive_reactions, 1);
    }

    #[tokio::test]
    async fn unknown_user_is_rejected_without_append() {
        let (handler, signals) = fixture();

        let cmd = RecordSignalCommand {
            user_id: UserId::new("ghost").unwrap(),
            kind: SignalKind::PositiveReaction,
            weight: None,
            sentiment: None,
        };
        let result = handler.handle(cmd).await;

        assert!(matches!(result, Err(RecordSignalError::UnknownUser(_))));
        assert!(signals.is_empty());
    }

    #[tokio::test]
    async fn mismatched_sentiment_and_kind_is_invalid() {
        let (handler, _) = fixture();

        let cmd = RecordSignalCommand {
            user_id: test_user(),
            kind: SignalKind::JourneyCompleted,
            weight: None,
            sentiment: Some(ReactionSentiment::Like),
        };
        let result = handler.handle(cmd).await;
        assert!(matches!(result, Err(RecordSignalError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn zero_weight_is_invalid() {
        let (handler, _) = fixture();

        let cmd = RecordSignalCommand {
            user_id: test_user(),
            kind: SignalKind::MessageEngaged,
            weight: Some(0),
            sentiment: None,
        };
        let result = handler.handle(cmd).await;
        assert!(matches!(result, Err(RecordSignalError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn explicit_weight_is_recorded() {
        let (handler, signals) = fixture();

        let cmd = RecordSignalCommand {
            user_id: test_user(),
            kind: SignalKind::MessageEngaged,
            weight: Some(3),
            sentiment: None,
        };
        handler.handle(cmd).await.unwrap();

        let events = signals.events_for_user(&test_user()).await.unwrap();
        assert_eq!(events[0].weight, 3);
    }

    #[tokio::test]
    async fn unknown_reaction_label_is_invalid() {
        let result = RecordSignalCommand::from_reaction(test_user(), "meh");
        assert!(result.is_err());
    }
}
