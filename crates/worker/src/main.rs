//! Offline catalog resync.
//!
//! Usage: `stockcat-worker <catalog.json>`
//!
//! Loads a catalog snapshot, submits `STOCKCAT_CATEGORY_ID` through the
//! settings handler, runs the queued resync and writes the snapshot back.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};

use stockcat_catalog::{CatalogSnapshot, InMemoryCatalogStore};
use stockcat_jobs::{InMemoryJobStore, JobExecutor, JobStore};
use stockcat_sync::{CategorySetting, StockCategoryService, SyncConfig, TargetCategory};

fn main() -> anyhow::Result<()> {
    stockcat_observability::init();

    let path: PathBuf = match std::env::args_os().nth(1) {
        Some(arg) => arg.into(),
        None => bail!("usage: stockcat-worker <catalog.json>"),
    };

    let config = SyncConfig::from_env().context("invalid configuration")?;
    let CategorySetting::Set(category) = config.category else {
        tracing::warn!("STOCKCAT_CATEGORY_ID not set; nothing to do");
        return Ok(());
    };

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let snapshot = CatalogSnapshot::from_json(&raw)?;
    let catalog = Arc::new(InMemoryCatalogStore::from_snapshot(snapshot));
    let jobs = InMemoryJobStore::arc();

    // Start unset so the configured id goes through validation like a
    // settings submission would.
    let service =
        StockCategoryService::new(catalog.clone(), jobs.clone(), TargetCategory::default());
    let mut executor = JobExecutor::new(jobs.clone());
    service.register_jobs(&mut executor);

    service
        .handle_config_change(&category.to_string())
        .with_context(|| format!("category {category} rejected"))?;
    executor.run_pending().context("failed to run queued jobs")?;

    let stats = jobs.stats()?;
    let updated = catalog.snapshot()?.to_json_pretty()?;
    std::fs::write(&path, updated)
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        category_id = %category,
        writes = catalog.write_count(),
        "catalog written"
    );

    if stats.failed > 0 {
        bail!("catalog resync finished with failures");
    }
    Ok(())
}
