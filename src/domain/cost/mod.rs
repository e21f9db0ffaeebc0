//! Cost module - append-only financial accountability for external calls.

mod record;

pub use record::{Capability, CostOwner, CostRecord, CostWindow};
