//! In-memory append-only cost ledger.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::cost::{CostOwner, CostRecord, CostWindow};
use crate::domain::foundation::DomainError;
use crate::ports::CostLedger;

/// In-memory `CostLedger` over an append-only vector.
pub struct InMemoryCostLedger {
    records: RwLock<Vec<CostRecord>>,
}

impl InMemoryCostLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Total number of ledger entries (test helper).
    pub fn len(&self) -> usize {
        self.records
            .read()
            .expect("InMemoryCostLedger: lock poisoned")
            .len()
    }

    /// True when the ledger is empty (test helper).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryCostLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CostLedger for InMemoryCostLedger {
    async fn record(&self, record: CostRecord) -> Result<(), DomainError> {
        self.records
            .write()
            .expect("InMemoryCostLedger: lock poisoned")
            .push(record);
        Ok(())
    }

    async fn total(&self, owner: &CostOwner, window: &CostWindow) -> Result<u64, DomainError> {
        Ok(self
            .records
            .read()
            .expect("InMemoryCostLedger: lock poisoned")
            .iter()
            .filter(|r| &r.owner == owner && window.contains(&r.recorded_at))
            .map(|r| u64::from(r.unit_cost_cents))
            .sum())
    }

    async fn records_for_owner(&self, owner: &CostOwner) -> Result<Vec<CostRecord>, DomainError> {
        Ok(self
            .records
            .read()
            .expect("InMemoryCostLedger: lock poisoned")
            .iter()
            .filter(|r| &r.owner == owner)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cost::Capability;
    use crate::domain::foundation::{JourneyId, Timestamp};

    fn owner() -> CostOwner {
        CostOwner::Journey(JourneyId::new())
    }

    #[tokio::test]
    async fn total_sums_only_matching_owner() {
        let ledger = InMemoryCostLedger::new();
        let mine = owner();
        let other = owner();

        ledger
            .record(CostRecord::new(mine.clone(), Capability::TextGeneration, 2))
            .await
            .unwrap();
        ledger
            .record(CostRecord::new(mine.clone(), Capability::ImageGeneration, 10))
            .await
            .unwrap();
        ledger
            .record(CostRecord::new(other, Capability::TextGeneration, 99))
            .await
            .unwrap();

        assert_eq!(ledger.total(&mine, &CostWindow::all()).await.unwrap(), 12);
    }

    #[tokio::test]
    async fn total_respects_window() {
        let ledger = InMemoryCostLedger::new();
        let mine = owner();

        ledger
            .record(CostRecord::new(mine.clone(), Capability::TextGeneration, 5))
            .await
            .unwrap();

        let future_window = CostWindow::since(Timestamp::now().plus_secs(3600));
        assert_eq!(ledger.total(&mine, &future_window).await.unwrap(), 0);
        assert_eq!(ledger.total(&mine, &CostWindow::all()).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn records_for_owner_returns_append_order() {
        let ledger = InMemoryCostLedger::new();
        let mine = owner();

        ledger
            .record(CostRecord::new(mine.clone(), Capability::TextGeneration, 1))
            .await
            .unwrap();
        ledger
            .record(CostRecord::new(mine.clone(), Capability::ImageGeneration, 2))
            .await
            .unwrap();

        let records = ledger.records_for_owner(&mine).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].capability, Capability::TextGeneration);
        assert_eq!(records[1].capability, Capability::ImageGeneration);
    }
}
