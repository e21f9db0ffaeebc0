//! Journey module - one diary entry's lifecycle through the four stages.

mod aggregate;
mod events;
mod safety_status;
mod stage;

pub use aggregate::{
    CuratorMessage, EscalationNote, GuestbookEntry, ImageRef, Journey, NextStep, Reflection,
};
pub use events::JourneyEvent;
pub use safety_status::SafetyStatus;
pub use stage::JourneyStage;
