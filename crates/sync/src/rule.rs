//! The stock category rule for a single product.

use tracing::{debug, warn};

use stockcat_catalog::{CatalogStore, Product, StockStatus};
use stockcat_core::{CatalogResult, CategoryId};

use crate::error::SyncError;

/// What applying the rule to one product did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Category appended and product saved.
    Added,
    /// Category removed and product saved.
    Removed,
    /// Membership already matched the stock status; nothing written.
    Unchanged,
    /// Stock status outside in-stock/out-of-stock; nothing written.
    IgnoredStatus(String),
    /// Configured category is missing from the taxonomy; sync skipped.
    StaleCategory(CategoryId),
    /// No category configured; the rule is off.
    Inactive,
}

impl SyncOutcome {
    /// Whether the product was written.
    pub fn wrote(&self) -> bool {
        matches!(self, SyncOutcome::Added | SyncOutcome::Removed)
    }

    /// The diagnostic behind a skipped sync, if any.
    pub fn diagnostic(&self) -> Option<SyncError> {
        match self {
            SyncOutcome::IgnoredStatus(raw) => Some(SyncError::UnknownStockStatus(raw.clone())),
            SyncOutcome::StaleCategory(id) => Some(SyncError::StaleCategoryId(*id)),
            _ => None,
        }
    }
}

/// Decide and apply the membership change in memory. Pure; no IO.
///
/// In stock adds `category` unless present, out of stock removes it if
/// present. Any other status leaves the product untouched.
pub fn apply_stock_rule(
    product: &mut Product,
    status: &StockStatus,
    category: CategoryId,
) -> SyncOutcome {
    match status {
        StockStatus::InStock => {
            if product.add_category(category) {
                SyncOutcome::Added
            } else {
                SyncOutcome::Unchanged
            }
        }
        StockStatus::OutOfStock => {
            if product.remove_category(category) {
                SyncOutcome::Removed
            } else {
                SyncOutcome::Unchanged
            }
        }
        StockStatus::Other(raw) => SyncOutcome::IgnoredStatus(raw.clone()),
    }
}

/// Applies the rule and persists the product when it changed.
///
/// At most one write per call. Store errors are returned as-is; the caller
/// decides whether they abort anything.
#[derive(Debug, Clone)]
pub struct StockCategorySync<S> {
    store: S,
}

impl<S: CatalogStore> StockCategorySync<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn sync(
        &self,
        product: &mut Product,
        status: &StockStatus,
        category: CategoryId,
    ) -> CatalogResult<SyncOutcome> {
        let outcome = apply_stock_rule(product, status, category);

        if outcome.wrote() {
            self.store.save(product)?;
            debug!(
                product_id = %product.id(),
                category_id = %category,
                outcome = ?outcome,
                "category membership updated"
            );
        } else if let Some(diagnostic) = outcome.diagnostic() {
            warn!(product_id = %product.id(), error = %diagnostic, "stock category sync skipped");
        }

        Ok(outcome)
    }
}
