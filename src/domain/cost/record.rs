//! Cost ledger entries for external capability calls.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CostRecordId, JourneyId, Timestamp, TrainingJobId};

/// The external capability a cost was incurred against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    TextGeneration,
    ImageGeneration,
    Training,
}

impl Capability {
    /// Returns the capability name used in ledger entries and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Capability::TextGeneration => "text_generation",
            Capability::ImageGeneration => "image_generation",
            Capability::Training => "training",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Who a ledger entry is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostOwner {
    Journey(JourneyId),
    TrainingJob(TrainingJobId),
}

impl std::fmt::Display for CostOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CostOwner::Journey(id) => write!(f, "journey/{}", id),
            CostOwner::TrainingJob(id) => write!(f, "training/{}", id),
        }
    }
}

/// One appended ledger entry. Every attempted external call records one,
/// whether the call succeeded or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub id: CostRecordId,
    pub owner: CostOwner,
    pub capability: Capability,
    pub unit_cost_cents: u32,
    pub recorded_at: Timestamp,
}

impl CostRecord {
    /// Creates a ledger entry stamped with the current time.
    pub fn new(owner: CostOwner, capability: Capability, unit_cost_cents: u32) -> Self {
        Self {
            id: CostRecordId::new(),
            owner,
            capability,
            unit_cost_cents,
            recorded_at: Timestamp::now(),
        }
    }
}

/// Half-open time window for ledger queries; `None` bounds are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostWindow {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

impl CostWindow {
    /// A window covering all time.
    pub fn all() -> Self {
        Self::default()
    }

    /// A window starting at `from`, unbounded above.
    pub fn since(from: Timestamp) -> Self {
        Self {
            from: Some(from),
            to: None,
        }
    }

    /// True when the instant falls inside the window.
    pub fn contains(&self, at: &Timestamp) -> bool {
        if let Some(from) = &self.from {
            if at.is_before(from) {
                return false;
            }
        }
        if let Some(to) = &self.to {
            if !at.is_before(to) {
                return false;
            }
        }
        true
    }
}
