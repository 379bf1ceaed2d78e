//! Catalog-wide resynchronization.

use tracing::{error, info, warn};

use stockcat_catalog::CatalogStore;
use stockcat_core::{CatalogError, CatalogResult, CategoryId, ProductId};
use stockcat_jobs::{Job, JobResult};

use crate::rule::{StockCategorySync, SyncOutcome};
use crate::settings::{CategorySetting, TargetCategory};
use crate::taxonomy::CategoryExistenceCheck;

/// Queue name of the deferred catalog resync.
pub const RESYNC_TASK: &str = "stock_category_sync";

/// Why a resync run did not look at any product.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResyncSkip {
    Inactive,
    StaleCategory(CategoryId),
}

/// Tally of one resync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResyncReport {
    pub examined: usize,
    pub added: usize,
    pub removed: usize,
    pub unchanged: usize,
    pub ignored: usize,
    pub failures: Vec<(ProductId, CatalogError)>,
    pub skipped: Option<ResyncSkip>,
}

impl ResyncReport {
    fn skipped(reason: ResyncSkip) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::default()
        }
    }

    fn record(&mut self, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::Added => self.added += 1,
            SyncOutcome::Removed => self.removed += 1,
            SyncOutcome::IgnoredStatus(_) => self.ignored += 1,
            SyncOutcome::Unchanged | SyncOutcome::StaleCategory(_) | SyncOutcome::Inactive => {
                self.unchanged += 1
            }
        }
    }

    pub fn writes(&self) -> usize {
        self.added + self.removed
    }
}

/// Re-applies the stock category rule to every product in the catalog.
///
/// Products are handled independently, each with its own stock status; a
/// failed write is logged and recorded, and the run moves on.
#[derive(Debug, Clone)]
pub struct BulkResync<S> {
    store: S,
    sync: StockCategorySync<S>,
    existence: CategoryExistenceCheck<S>,
    target: TargetCategory,
}

impl<S: CatalogStore + Clone> BulkResync<S> {
    pub fn new(store: S, target: TargetCategory) -> Self {
        Self {
            sync: StockCategorySync::new(store.clone()),
            existence: CategoryExistenceCheck::new(store.clone()),
            store,
            target,
        }
    }

    /// Run once over the whole catalog.
    ///
    /// Returns an error only when the catalog cannot be read at all.
    pub fn resync_all(&self) -> CatalogResult<ResyncReport> {
        let category = match self.target.get() {
            CategorySetting::Unset => {
                info!("catalog resync skipped: no category configured");
                return Ok(ResyncReport::skipped(ResyncSkip::Inactive));
            }
            CategorySetting::Set(id) => id,
        };

        if !self.existence.exists(category)? {
            warn!(category_id = %category, "catalog resync skipped: configured category no longer exists");
            return Ok(ResyncReport::skipped(ResyncSkip::StaleCategory(category)));
        }

        let mut report = ResyncReport::default();
        for mut product in self.store.products()? {
            report.examined += 1;
            let status = product.stock_status().clone();
            match self.sync.sync(&mut product, &status, category) {
                Ok(outcome) => report.record(&outcome),
                Err(e) => {
                    error!(product_id = %product.id(), error = %e, "failed to sync product category");
                    report.failures.push((product.id(), e));
                }
            }
        }

        info!(
            category_id = %category,
            examined = report.examined,
            added = report.added,
            removed = report.removed,
            ignored = report.ignored,
            failed = report.failures.len(),
            "catalog resync finished"
        );
        Ok(report)
    }
}

impl<S: CatalogStore + Clone + 'static> BulkResync<S> {
    /// Adapter for `JobExecutor::register_handler`.
    pub fn into_job_handler(self) -> impl Fn(&Job) -> JobResult + Send + Sync + 'static {
        move |job: &Job| match self.resync_all() {
            Ok(report) if report.failures.is_empty() => JobResult::Success,
            Ok(report) => JobResult::Failure(format!(
                "{} of {} products could not be saved",
                report.failures.len(),
                report.examined
            )),
            Err(e) => {
                error!(job_id = %job.id, error = %e, "catalog resync aborted");
                JobResult::Failure(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use stockcat_catalog::{InMemoryCatalogStore, Product, StockStatus};

    const CAT: CategoryId = CategoryId::new(7);

    fn seeded_store() -> Arc<InMemoryCatalogStore> {
        let store = InMemoryCatalogStore::arc();
        store.add_category(CAT);
        store.insert(Product::new(ProductId::new(1), "P1", StockStatus::InStock));
        store.insert(
            Product::new(ProductId::new(2), "P2", StockStatus::OutOfStock).with_categories([CAT]),
        );
        store.insert(
            Product::new(ProductId::new(3), "P3", StockStatus::InStock).with_categories([CAT]),
        );
        store
    }

    fn categories(store: &InMemoryCatalogStore, id: u64) -> Vec<CategoryId> {
        store
            .product(ProductId::new(id))
            .unwrap()
            .unwrap()
            .category_ids()
            .to_vec()
    }

    #[test]
    fn reconciles_each_product_independently() {
        let store = seeded_store();
        let resync = BulkResync::new(store.clone(), TargetCategory::new(CategorySetting::Set(CAT)));

        let report = resync.resync_all().unwrap();

        assert_eq!(categories(&store, 1), vec![CAT]);
        assert!(categories(&store, 2).is_empty());
        assert_eq!(categories(&store, 3), vec![CAT]);
        assert_eq!(report.examined, 3);
        assert_eq!((report.added, report.removed, report.unchanged), (1, 1, 1));
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn failed_write_does_not_abort_the_run() {
        let store = seeded_store();
        store.reject_writes_for(ProductId::new(1));
        let resync = BulkResync::new(store.clone(), TargetCategory::new(CategorySetting::Set(CAT)));

        let report = resync.resync_all().unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, ProductId::new(1));
        assert!(categories(&store, 2).is_empty());
    }

    #[test]
    fn unset_configuration_skips_run() {
        let store = seeded_store();
        let resync = BulkResync::new(store.clone(), TargetCategory::default());

        let report = resync.resync_all().unwrap();

        assert_eq!(report.skipped, Some(ResyncSkip::Inactive));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn stale_category_skips_run() {
        let store = seeded_store();
        store.remove_category(CAT);
        let target = TargetCategory::new(CategorySetting::Set(CAT));
        let resync = BulkResync::new(store.clone(), target.clone());

        let report = resync.resync_all().unwrap();

        assert_eq!(report.skipped, Some(ResyncSkip::StaleCategory(CAT)));
        assert_eq!(store.write_count(), 0);
        assert_eq!(target.get(), CategorySetting::Set(CAT));
    }

    #[test]
    fn unknown_statuses_are_counted_not_written() {
        let store = InMemoryCatalogStore::arc();
        store.add_category(CAT);
        store.insert(Product::new(ProductId::new(1), "P", StockStatus::parse("onbackorder")));
        let resync = BulkResync::new(store.clone(), TargetCategory::new(CategorySetting::Set(CAT)));

        let report = resync.resync_all().unwrap();

        assert_eq!(report.ignored, 1);
        assert_eq!(report.writes(), 0);
    }

    #[test]
    fn job_handler_reports_write_failures() {
        let store = seeded_store();
        store.reject_writes_for(ProductId::new(2));
        let handler =
            BulkResync::new(store, TargetCategory::new(CategorySetting::Set(CAT))).into_job_handler();

        let result = handler(&Job::new(RESYNC_TASK));

        assert_eq!(
            result,
            JobResult::Failure("1 of 3 products could not be saved".to_string())
        );
    }
}
