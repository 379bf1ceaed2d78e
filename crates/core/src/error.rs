//! Catalog error model.

use thiserror::Error;

use crate::id::ProductId;

/// Result type returned by catalog store operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Failure reported by (or on behalf of) the external catalog store.
///
/// These are not handled by the sync rule; they propagate to whoever invoked
/// it. Bulk runs record them per product instead of aborting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The store refused to persist a product.
    #[error("write rejected for product {product_id}: {reason}")]
    WriteRejected { product_id: ProductId, reason: String },

    /// Backend failure (lock poisoning, IO, ...).
    #[error("storage error: {0}")]
    Storage(String),

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl CatalogError {
    pub fn write_rejected(product_id: ProductId, reason: impl Into<String>) -> Self {
        Self::WriteRejected {
            product_id,
            reason: reason.into(),
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
