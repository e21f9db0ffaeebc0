//! Safety module - rule-driven validation of artifacts before attachment.

mod gate;
mod rules;

pub use gate::{ContentKind, GateSubject, SafetyGate, Verdict};
pub use rules::{RejectionCategory, RuleSet, RuleSetError, RuleSeverity, SafetyRule};
