//! GetJourneyHandler - loads one journey with its cost total.

use std::sync::Arc;

use crate::domain::cost::{CostOwner, CostWindow};
use crate::domain::foundation::{DomainError, JourneyId};
use crate::domain::journey::{Journey, NextStep};
use crate::ports::{CostLedger, JourneyRepository};

use super::AdvanceError;

/// One journey plus derived readouts for the caller.
#[derive(Debug, Clone)]
pub struct GetJourneyResult {
    pub journey: Journey,
    pub next_step: NextStep,
    /// Total cents spent on this journey's external calls.
    pub cost_cents: u64,
}

/// Handler for loading a journey.
pub struct GetJourneyHandler {
    journey_repository: Arc<dyn JourneyRepository>,
    cost_ledger: Arc<dyn CostLedger>,
}

impl GetJourneyHandler {
    pub fn new(
        journey_repository: Arc<dyn JourneyRepository>,
        cost_ledger: Arc<dyn CostLedger>,
    ) -> Self {
        Self {
            journey_repository,
            cost_ledger,
        }
    }

    pub async fn handle(&self, journey_id: JourneyId) -> Result<GetJourneyResult, AdvanceError> {
        let journey = self
            .journey_repository
            .find_by_id(&journey_id)
            .await
            .map_err(AdvanceError::from)?
            .ok_or(AdvanceError::JourneyNotFound(journey_id))?;

        let cost_cents = self
            .cost_ledger
            .total(&CostOwner::Journey(journey_id), &CostWindow::all())
            .await
            .map_err(|e: DomainError| AdvanceError::Domain(e))?;

        let next_step = journey.next_step();
        Ok(GetJourneyResult {
            journey,
            next_step,
            cost_cents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryCostLedger, InMemoryJourneyRepository};
    use crate::domain::cost::{Capability, CostRecord};
    use crate::domain::foundation::{UserId, VadScore};

    #[tokio::test]
    async fn returns_journey_with_cost_and_next_step() {
        let journeys = Arc::new(InMemoryJourneyRepository::new());
        let ledger = Arc::new(InMemoryCostLedger::new());

        let journey = Journey::new(
            UserId::new("user-1").unwrap(),
            "entry",
            vec![],
            VadScore::new(0.5, 0.5, 0.5).unwrap(),
        )
        .unwrap();
        let id = journey.id();
        journeys.save(&journey).await.unwrap();
        ledger
            .record(CostRecord::new(
                CostOwner::Journey(id),
                Capability::TextGeneration,
                2,
            ))
            .await
            .unwrap();

        let handler = GetJourneyHandler::new(
            journeys as Arc<dyn JourneyRepository>,
            ledger as Arc<dyn CostLedger>,
        );
        let result = handler.handle(id).await.unwrap();

        assert_eq!(result.journey.id(), id);
        assert_eq!(result.next_step, NextStep::Reflection);
        assert_eq!(result.cost_cents, 2);
    }

    #[tokio::test]
    async fn missing_journey_is_reported() {
        let handler = GetJourneyHandler::new(
            Arc::new(InMemoryJourneyRepository::new()),
            Arc::new(InMemoryCostLedger::new()),
        );
        let result = handler.handle(JourneyId::new()).await;
        assert!(matches!(result, Err(AdvanceError::JourneyNotFound(_))));
    }
}
