//! In-memory adapters for the persistence ports.
//!
//! Deterministic and lock-based, intended for tests and the local dev
//! harness; a deployment swaps these for real storage adapters.

mod costs;
mod journeys;
mod personalization;
mod signals;
mod users;

pub use costs::InMemoryCostLedger;
pub use journeys::InMemoryJourneyRepository;
pub use personalization::InMemoryPersonalizationStore;
pub use signals::InMemorySignalStore;
pub use users::InMemoryUserRepository;
