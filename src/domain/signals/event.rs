//! Behavioral signal events.
//!
//! Signals are append-only: the ledger is the source of truth for tier
//! promotion, and summaries are recomputed by folding the log rather than
//! kept as mutable counters. That makes promotion decisions replayable and
//! sidesteps lost-update races under concurrent writers.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SignalEventId, Timestamp, UserId, ValidationError};

/// What kind of engagement the event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// The user reacted warmly to a curator message or artwork.
    PositiveReaction,
    /// A journey reached Closure.
    JourneyCompleted,
    /// The user interacted with a message beyond reading it.
    MessageEngaged,
}

/// Reaction labels the client offers on curator messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionSentiment {
    Like,
    Touched,
    Comforted,
    Saved,
    Shared,
}

impl ReactionSentiment {
    /// The signal kind this sentiment contributes to.
    pub fn signal_kind(&self) -> SignalKind {
        match self {
            ReactionSentiment::Like
            | ReactionSentiment::Touched
            | ReactionSentiment::Comforted => SignalKind::PositiveReaction,
            ReactionSentiment::Saved | ReactionSentiment::Shared => SignalKind::MessageEngaged,
        }
    }

    /// Parses a client-supplied label.
    pub fn parse(label: &str) -> Result<Self, ValidationError> {
        match label.trim().to_lowercase().as_str() {
            "like" => Ok(ReactionSentiment::Like),
            "touched" => Ok(ReactionSentiment::Touched),
            "comforted" => Ok(ReactionSentiment::Comforted),
            "saved" => Ok(ReactionSentiment::Saved),
            "shared" => Ok(ReactionSentiment::Shared),
            other => Err(ValidationError::invalid_format(
                "reaction",
                format!("unknown reaction label '{}'", other),
            )),
        }
    }
}

/// One appended signal event. Never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub id: SignalEventId,
    pub user_id: UserId,
    pub kind: SignalKind,
    /// Contribution to the engagement score; defaults to 1.
    pub weight: u32,
    /// Present for reaction-driven events.
    pub sentiment: Option<ReactionSentiment>,
    pub recorded_at: Timestamp,
}

impl SignalEvent {
    /// Creates an event with the default weight of 1.
    pub fn new(user_id: UserId, kind: SignalKind) -> Self {
        Self {
            id: SignalEventId::new(),
            user_id,
            kind,
            weight: 1,
            sentiment: None,
            recorded_at: Timestamp::now(),
        }
    }

    /// Creates an event from a client reaction.
    pub fn from_reaction(user_id: UserId, sentiment: ReactionSentiment) -> Self {
        Self {
            id: SignalEventId::new(),
            user_id,
            kind: sentiment.signal_kind(),
            weight: 1,
            sentiment: Some(sentiment),
            recorded_at: Timestamp::now(),
        }
    }

    /// Creates the completion event recorded when a journey seals.
    pub fn journey_completed(user_id: UserId) -> Self {
        Self::new(user_id, SignalKind::JourneyCompleted)
    }

    /// Overrides the default weight.
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }
}
