//! Adapter from a stock-change event subscription to the service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use stockcat_catalog::CatalogStore;
use stockcat_events::{Event, StockStatusChanged, Subscription};
use stockcat_jobs::JobQueue;

use crate::service::StockCategoryService;

/// Counts from one drain of the subscription.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DrainSummary {
    pub processed: usize,
    pub failed: usize,
    /// Latest catalog timestamp among the events seen, failed ones included.
    pub newest_event_at: Option<DateTime<Utc>>,
}

impl DrainSummary {
    fn record<E: Event>(&mut self, event: &E, ok: bool) {
        self.processed += 1;
        if !ok {
            self.failed += 1;
        }
        let at = event.occurred_at();
        if self.newest_event_at.is_none_or(|newest| at > newest) {
            self.newest_event_at = Some(at);
        }
    }
}

/// Feeds `StockStatusChanged` events into `handle_stock_change`, one at a time.
///
/// A failing event is logged and counted; it does not stop the listener.
#[derive(Debug)]
pub struct StockChangeListener<S, Q> {
    service: Arc<StockCategoryService<S, Q>>,
    subscription: Subscription<StockStatusChanged>,
}

impl<S, Q> StockChangeListener<S, Q>
where
    S: CatalogStore + Clone,
    Q: JobQueue,
{
    pub fn new(
        service: Arc<StockCategoryService<S, Q>>,
        subscription: Subscription<StockStatusChanged>,
    ) -> Self {
        Self {
            service,
            subscription,
        }
    }

    /// Process every event already delivered, without blocking.
    pub fn drain(&self) -> DrainSummary {
        let mut summary = DrainSummary::default();
        for event in self.subscription.pending() {
            self.dispatch(&event, &mut summary);
        }
        summary
    }

    /// Block and process events until the bus goes away.
    pub fn run(&self) -> DrainSummary {
        let mut summary = DrainSummary::default();
        for event in self.subscription.incoming() {
            self.dispatch(&event, &mut summary);
        }
        info!(processed = summary.processed, failed = summary.failed, "stock change listener stopped");
        summary
    }

    fn dispatch(&self, event: &StockStatusChanged, summary: &mut DrainSummary) {
        debug!(
            event_type = event.event_type(),
            version = event.version(),
            occurred_at = %event.occurred_at(),
            product_id = %event.product_id,
            "stock change received"
        );
        let result = self.service.handle_stock_change(event);
        if let Err(e) = &result {
            error!(
                event_type = event.event_type(),
                occurred_at = %event.occurred_at(),
                product_id = %event.product_id,
                error = %e,
                "failed to handle stock change"
            );
        }
        summary.record(event, result.is_ok());
    }
}
