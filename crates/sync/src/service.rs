//! Service facade: the stock rule plus the resync it schedules.

use tracing::{debug, warn};

use stockcat_catalog::CatalogStore;
use stockcat_core::{CatalogResult, CategoryId};
use stockcat_events::StockStatusChanged;
use stockcat_jobs::{JobExecutor, JobQueue, JobStore};

use crate::bulk::{BulkResync, RESYNC_TASK, ResyncReport};
use crate::error::SyncError;
use crate::rule::{StockCategorySync, SyncOutcome};
use crate::settings::{CategorySetting, ConfigurationUpdateHandler, TargetCategory};
use crate::taxonomy::CategoryExistenceCheck;

/// Entry points a host wires its catalog events and settings form into.
///
/// All components share one `TargetCategory`, so an accepted setting applies
/// to the very next stock change.
#[derive(Debug, Clone)]
pub struct StockCategoryService<S, Q> {
    sync: StockCategorySync<S>,
    existence: CategoryExistenceCheck<S>,
    bulk: BulkResync<S>,
    settings: ConfigurationUpdateHandler<S, Q>,
    target: TargetCategory,
}

impl<S, Q> StockCategoryService<S, Q>
where
    S: CatalogStore + Clone,
    Q: JobQueue,
{
    pub fn new(store: S, queue: Q, target: TargetCategory) -> Self {
        Self {
            sync: StockCategorySync::new(store.clone()),
            existence: CategoryExistenceCheck::new(store.clone()),
            bulk: BulkResync::new(store.clone(), target.clone()),
            settings: ConfigurationUpdateHandler::new(store, queue, target.clone()),
            target,
        }
    }

    pub fn target(&self) -> CategorySetting {
        self.target.get()
    }

    /// React to a stock status change of one product.
    ///
    /// Diagnostics (rule off, stale category, unexpected status) come back as
    /// outcomes; only catalog failures are errors.
    pub fn handle_stock_change(&self, event: &StockStatusChanged) -> CatalogResult<SyncOutcome> {
        let category = match self.target.get() {
            CategorySetting::Unset => {
                debug!(product_id = %event.product_id, "stock change ignored: no category configured");
                return Ok(SyncOutcome::Inactive);
            }
            CategorySetting::Set(id) => id,
        };

        if !self.existence.exists(category)? {
            let diagnostic = SyncError::StaleCategoryId(category);
            warn!(product_id = %event.product_id, error = %diagnostic, "stock change ignored");
            return Ok(SyncOutcome::StaleCategory(category));
        }

        let mut product = event.product.clone();
        self.sync.sync(&mut product, &event.stock_status, category)
    }

    /// Validate and apply a settings submission.
    pub fn handle_config_change(&self, raw: &str) -> Result<CategoryId, SyncError> {
        self.settings.on_setting_change(raw)
    }

    /// Reconcile the whole catalog right now, on the calling thread.
    pub fn resync_all(&self) -> CatalogResult<ResyncReport> {
        self.bulk.resync_all()
    }
}

impl<S, Q> StockCategoryService<S, Q>
where
    S: CatalogStore + Clone + 'static,
    Q: JobQueue,
{
    /// Bind the queued resync task to this service's catalog and setting.
    pub fn register_jobs<J: JobStore + 'static>(&self, executor: &mut JobExecutor<J>) {
        executor.register_handler(RESYNC_TASK, self.bulk.clone().into_job_handler());
    }
}
