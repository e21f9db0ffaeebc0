//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the therapeutic journey domain.

mod command;
mod coping_style;
mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;
mod vad;

pub use command::CommandMetadata;
pub use coping_style::CopingStyle;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{
    domain_event, DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent,
};
pub use ids::{CostRecordId, JourneyId, SignalEventId, TrainingJobId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
pub use vad::VadScore;
