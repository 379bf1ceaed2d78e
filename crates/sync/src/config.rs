//! Startup configuration.
//!
//! The category id is read once when the process starts; afterwards it only
//! changes through `ConfigurationUpdateHandler`.

use thiserror::Error;

use stockcat_core::CategoryId;

use crate::settings::{CategorySetting, TargetCategory};

/// Environment variable holding the initial category id.
pub const CATEGORY_ID_ENV: &str = "STOCKCAT_CATEGORY_ID";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidCategoryId { var: &'static str, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncConfig {
    pub category: CategorySetting,
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing, empty and `0` mean unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let category = match lookup(CATEGORY_ID_ENV) {
            None => CategorySetting::Unset,
            Some(raw) if raw.trim().is_empty() => CategorySetting::Unset,
            Some(raw) => {
                let id: CategoryId = raw.parse().map_err(|_| ConfigError::InvalidCategoryId {
                    var: CATEGORY_ID_ENV,
                    value: raw.clone(),
                })?;
                if id.get() == 0 {
                    CategorySetting::Unset
                } else {
                    CategorySetting::Set(id)
                }
            }
        };
        Ok(Self { category })
    }

    /// A fresh shared handle seeded with the configured value.
    pub fn target(&self) -> TargetCategory {
        TargetCategory::new(self.category)
    }
}
