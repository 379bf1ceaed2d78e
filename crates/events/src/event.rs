//! What every catalog event exposes to the plumbing that carries it.

use chrono::{DateTime, Utc};

/// A fact reported by the catalog. Handlers read events and never change them.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted name used in logs, e.g. `catalog.product.stock_status_changed`.
    fn event_type(&self) -> &'static str;

    /// Payload version, bumped when fields change incompatibly.
    fn version(&self) -> u32;

    /// Catalog-side timestamp of the change.
    fn occurred_at(&self) -> DateTime<Utc>;
}
