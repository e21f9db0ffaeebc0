//! Ports - interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Capability Ports
//!
//! - `TextGenerator` / `ImageGenerator` - generation capabilities
//! - `TrainingService` - fine-tuning pipeline
//! - `ReviewNotifier` - fire-and-forget human-review channel
//!
//! ## Persistence Ports
//!
//! - `JourneyRepository` / `UserRepository` - aggregate stores
//! - `SignalStore` / `CostLedger` - append-only ledgers
//! - `PersonalizationStore` - per-user tier state
//!
//! ## Event Ports
//!
//! - `EventPublisher` / `EventSubscriber` / `EventHandler` - domain events

mod cost_ledger;
mod event_publisher;
mod event_subscriber;
mod image_generator;
mod journey_repository;
mod personalization_store;
mod review_notifier;
mod signal_store;
mod text_generator;
mod trainer;
mod user_repository;

pub use cost_ledger::CostLedger;
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber};
pub use image_generator::ImageGenerator;
pub use journey_repository::{GalleryFilter, JourneyRepository};
pub use personalization_store::PersonalizationStore;
pub use review_notifier::{EscalationRecord, NotifyError, ReviewNotifier};
pub use signal_store::SignalStore;
pub use text_generator::{GeneratedText, GenerationContext, GenerationError, TextGenerator};
pub use trainer::{DatasetRef, TrainingError, TrainingService};
pub use user_repository::UserRepository;
