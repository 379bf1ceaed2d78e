//! The one setting this rule has: which category marks in-stock products.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tracing::{info, warn};

use stockcat_catalog::CatalogStore;
use stockcat_core::CategoryId;
use stockcat_jobs::JobQueue;

use crate::bulk::RESYNC_TASK;
use crate::error::SyncError;
use crate::taxonomy::CategoryExistenceCheck;

/// Configuration state.
///
/// `Unset -> Set(id)` on the first valid save, `Set(id) -> Set(id')` on later
/// ones. Rejected submissions never change it.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum CategorySetting {
    #[default]
    Unset,
    Set(CategoryId),
}

impl CategorySetting {
    pub fn category(self) -> Option<CategoryId> {
        match self {
            CategorySetting::Unset => None,
            CategorySetting::Set(id) => Some(id),
        }
    }
}

/// Shared handle to the configured category.
///
/// Cloned into every component that applies the rule, so a new value is
/// visible to the next event or resync without reloading anything.
#[derive(Debug, Clone, Default)]
pub struct TargetCategory {
    inner: Arc<RwLock<CategorySetting>>,
}

impl TargetCategory {
    pub fn new(initial: CategorySetting) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn get(&self) -> CategorySetting {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, id: CategoryId) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = CategorySetting::Set(id);
    }
}

/// Normalize a raw settings submission to a non-negative integer.
///
/// Reads the leading integer (an optional sign, then digits), takes its
/// absolute value and saturates at `u64::MAX`. Input without a leading
/// integer becomes 0.
pub fn normalize_category_input(raw: &str) -> CategoryId {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    let value = unsigned
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u64::from(digit - b'0'))
        });
    CategoryId::new(value)
}

/// Validates settings submissions and applies accepted ones.
#[derive(Debug, Clone)]
pub struct ConfigurationUpdateHandler<S, Q> {
    existence: CategoryExistenceCheck<S>,
    queue: Q,
    target: TargetCategory,
}

impl<S: CatalogStore, Q: JobQueue> ConfigurationUpdateHandler<S, Q> {
    pub fn new(store: S, queue: Q, target: TargetCategory) -> Self {
        Self {
            existence: CategoryExistenceCheck::new(store),
            queue,
            target,
        }
    }

    /// Handle a submitted value.
    ///
    /// On acceptance the new id is live immediately and one catalog resync is
    /// queued. If queueing fails the id stays applied and `Schedule` is
    /// returned. `InvalidCategoryId` leaves everything untouched; its message
    /// is meant for the user.
    pub fn on_setting_change(&self, raw: &str) -> Result<CategoryId, SyncError> {
        let id = normalize_category_input(raw);

        if !self.existence.exists(id)? {
            warn!(category_id = %id, "rejected category setting: category does not exist");
            return Err(SyncError::InvalidCategoryId(id));
        }

        let previous = self.target.get();
        self.target.set(id);
        let job_id = self.queue.enqueue(RESYNC_TASK)?;

        info!(
            category_id = %id,
            previous = ?previous.category(),
            job_id = %job_id,
            "category setting updated, catalog resync queued"
        );
        Ok(id)
    }
}

/// Kind of input a settings field renders as.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Number,
}

/// One field of the settings section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsField {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
    pub tooltip: &'static str,
}

/// Descriptor a host settings framework renders for this rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsSection {
    pub id: &'static str,
    pub tab_label: &'static str,
    pub title: &'static str,
    pub fields: Vec<SettingsField>,
}

pub const SETTINGS_SECTION_ID: &str = "autocat";
pub const CATEGORY_FIELD_ID: &str = "wc_autocat_id";

/// The settings section: a single numeric category id field.
pub fn settings_section() -> SettingsSection {
    SettingsSection {
        id: SETTINGS_SECTION_ID,
        tab_label: "In-stock category",
        title: "In-stock category settings",
        fields: vec![SettingsField {
            id: CATEGORY_FIELD_ID,
            label: "Category id",
            kind: FieldKind::Number,
            description: "Category with this id will be maintained for in-stock products",
            tooltip: "When the changes are saved, the selected category will be set (or unset) \
                      for all products depending on their stock status",
        }],
    }
}
