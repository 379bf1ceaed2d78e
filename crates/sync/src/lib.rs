//! Keeps an "in stock" category in sync with product stock status.
//!
//! - `rule`: the add/remove decision for one product
//! - `taxonomy`: category existence checks
//! - `bulk`: re-applying the rule to the whole catalog
//! - `settings`: validating and applying the configured category
//! - `service`: the entry points a host wires its events and settings into
//! - `listener`: drains stock-change events from a bus into the service

pub mod bulk;
pub mod config;
pub mod error;
pub mod listener;
pub mod rule;
pub mod service;
pub mod settings;
pub mod taxonomy;

pub use bulk::{BulkResync, RESYNC_TASK, ResyncReport, ResyncSkip};
pub use config::{ConfigError, SyncConfig};
pub use error::SyncError;
pub use listener::{DrainSummary, StockChangeListener};
pub use rule::{StockCategorySync, SyncOutcome, apply_stock_rule};
pub use service::StockCategoryService;
pub use settings::{
    CATEGORY_FIELD_ID, CategorySetting, ConfigurationUpdateHandler, FieldKind, SETTINGS_SECTION_ID,
    SettingsField, SettingsSection, TargetCategory, normalize_category_input, settings_section,
};
pub use taxonomy::CategoryExistenceCheck;
