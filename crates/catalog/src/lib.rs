//! Product catalog model and the store abstraction the sync rule runs against.
//!
//! The catalog itself is owned by an external system; `InMemoryCatalogStore`
//! stands in for it in tests, development and the worker binary.

pub mod product;
pub mod store;

pub use product::{Product, StockStatus};
pub use store::{CatalogSnapshot, CatalogStore, InMemoryCatalogStore};
