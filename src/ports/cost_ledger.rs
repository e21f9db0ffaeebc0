//! CostLedger port - append-only persistence for external-call costs.

use async_trait::async_trait;

use crate::domain::cost::{CostOwner, CostRecord, CostWindow};
use crate::domain::foundation::DomainError;

/// Port for the append-only cost ledger.
///
/// No business logic lives here; the ledger exists so that every external
/// call site is financially accountable.
#[async_trait]
pub trait CostLedger: Send + Sync {
    /// Appends one ledger entry. Always succeeds barring storage faults.
    async fn record(&self, record: CostRecord) -> Result<(), DomainError>;

    /// Sums unit costs for an owner within the window.
    async fn total(&self, owner: &CostOwner, window: &CostWindow) -> Result<u64, DomainError>;

    /// Returns an owner's entries in append order (diagnostics and tests).
    async fn records_for_owner(&self, owner: &CostOwner) -> Result<Vec<CostRecord>, DomainError>;
}
