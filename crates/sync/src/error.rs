use thiserror::Error;

use stockcat_core::{CatalogError, CategoryId};
use stockcat_jobs::JobStoreError;

/// Errors and diagnostics of the stock category rule.
///
/// `UnknownStockStatus` and `StaleCategoryId` are diagnostics: they are logged
/// and reported through a `SyncOutcome`, never returned from event handling.
/// `InvalidCategoryId` is the user-facing settings rejection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("unexpected stock status: {0:?}")]
    UnknownStockStatus(String),

    #[error("Category with this id doesn't exist, settings not updated.")]
    InvalidCategoryId(CategoryId),

    #[error("configured category {0} no longer exists, check the settings")]
    StaleCategoryId(CategoryId),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The setting was applied but the resync could not be queued.
    #[error("failed to schedule catalog resync: {0}")]
    Schedule(#[from] JobStoreError),
}
