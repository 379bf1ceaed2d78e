//! The stock status change event raised by the catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockcat_catalog::{Product, StockStatus};
use stockcat_core::ProductId;

use crate::event::Event;

/// Event: a product's stock status changed.
///
/// Carries the product as the catalog saw it when the status flipped, so
/// handlers can act without another read. `stock_status` is the new status and
/// wins over whatever `product.stock_status()` says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockStatusChanged {
    pub product_id: ProductId,
    pub stock_status: StockStatus,
    pub product: Product,
    pub occurred_at: DateTime<Utc>,
}

impl StockStatusChanged {
    pub const EVENT_TYPE: &'static str = "catalog.product.stock_status_changed";

    /// Build the event for `product`, stamped now.
    pub fn new(product: Product, stock_status: StockStatus) -> Self {
        Self {
            product_id: product.id(),
            stock_status,
            product,
            occurred_at: Utc::now(),
        }
    }
}

impl Event for StockStatusChanged {
    fn event_type(&self) -> &'static str {
        Self::EVENT_TYPE
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
