//! Adapters - implementations of the ports.
//!
//! In-memory stores and mocks cover tests and the local dev harness;
//! the HTTP adapters cover the external generation and review services.

pub mod events;
pub mod generation;
pub mod memory;
pub mod notify;

pub use events::InMemoryEventBus;
pub use generation::{
    HttpGenerationClient, HttpGenerationConfig, MockImageGenerator, MockTextGenerator,
};
pub use memory::{
    InMemoryCostLedger, InMemoryJourneyRepository, InMemoryPersonalizationStore,
    InMemorySignalStore, InMemoryUserRepository,
};
pub use notify::{LoggingReviewNotifier, WebhookReviewNotifier};
