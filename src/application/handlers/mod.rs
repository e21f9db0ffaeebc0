//! Command handlers - one per core-exposed operation.

pub mod journey;
pub mod personalization;
pub mod signals;
