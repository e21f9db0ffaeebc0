//! Application layer - command handlers and cross-cutting services.
//!
//! Handlers orchestrate aggregates, ports, and the safety gate; the
//! shared services here cover keyed locking, retry, and the generation
//! pipeline they all lean on.

pub mod handlers;
pub mod locks;
pub mod pipeline;
pub mod retry;

pub use locks::{JourneyGuard, JourneyLocks, UserGuard, UserLocks};
pub use pipeline::GenerationPipeline;
pub use retry::RetryPolicy;
