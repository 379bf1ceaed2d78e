//! Catalog products and the stock status they report.

use serde::{Deserialize, Serialize};

use stockcat_core::{CategoryId, ProductId};

/// Inventory state of a product as reported by the catalog.
///
/// Only `InStock` and `OutOfStock` drive the category rule. Anything else the
/// catalog reports (backorder, custom states) is kept verbatim in `Other` so
/// it can be logged and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StockStatus {
    InStock,
    OutOfStock,
    Other(String),
}

impl StockStatus {
    pub const IN_STOCK: &'static str = "instock";
    pub const OUT_OF_STOCK: &'static str = "outofstock";

    pub fn parse(raw: &str) -> Self {
        match raw {
            Self::IN_STOCK => Self::InStock,
            Self::OUT_OF_STOCK => Self::OutOfStock,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::InStock => Self::IN_STOCK,
            Self::OutOfStock => Self::OUT_OF_STOCK,
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for StockStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            Self::IN_STOCK => Self::InStock,
            Self::OUT_OF_STOCK => Self::OutOfStock,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for StockStatus {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<StockStatus> for String {
    fn from(value: StockStatus) -> Self {
        match value {
            StockStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog product, as far as the category rule is concerned.
///
/// Category ids are kept unique; their order is preserved but carries no
/// meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ProductRecord")]
pub struct Product {
    id: ProductId,
    #[serde(default)]
    name: String,
    stock_status: StockStatus,
    #[serde(default)]
    category_ids: Vec<CategoryId>,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, stock_status: StockStatus) -> Self {
        Self {
            id,
            name: name.into(),
            stock_status,
            category_ids: Vec::new(),
        }
    }

    /// Replace the category list, dropping duplicates (first occurrence wins).
    pub fn with_categories(mut self, ids: impl IntoIterator<Item = CategoryId>) -> Self {
        self.set_category_ids(ids);
        self
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stock_status(&self) -> &StockStatus {
        &self.stock_status
    }

    pub fn category_ids(&self) -> &[CategoryId] {
        &self.category_ids
    }

    pub fn set_category_ids(&mut self, ids: impl IntoIterator<Item = CategoryId>) {
        self.category_ids.clear();
        for id in ids {
            if !self.category_ids.contains(&id) {
                self.category_ids.push(id);
            }
        }
    }

    pub fn has_category(&self, id: CategoryId) -> bool {
        self.category_ids.contains(&id)
    }

    /// Append `id` unless already present. Returns whether the list changed.
    pub fn add_category(&mut self, id: CategoryId) -> bool {
        if self.has_category(id) {
            return false;
        }
        self.category_ids.push(id);
        true
    }

    /// Remove `id` if present. Returns whether the list changed.
    pub fn remove_category(&mut self, id: CategoryId) -> bool {
        let before = self.category_ids.len();
        self.category_ids.retain(|c| *c != id);
        self.category_ids.len() != before
    }
}

/// Wire shape of a product. Loaded records go through `set_category_ids` so
/// duplicated ids in stored JSON collapse on the way in.
#[derive(Deserialize)]
struct ProductRecord {
    id: ProductId,
    #[serde(default)]
    name: String,
    stock_status: StockStatus,
    #[serde(default)]
    category_ids: Vec<CategoryId>,
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Product::new(record.id, record.name, record.stock_status)
            .with_categories(record.category_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(id: u64) -> CategoryId {
        CategoryId::new(id)
    }

    #[test]
    fn stock_status_parses_known_values() {
        assert_eq!(StockStatus::parse("instock"), StockStatus::InStock);
        assert_eq!(StockStatus::parse("outofstock"), StockStatus::OutOfStock);
        assert_eq!(
            StockStatus::parse("onbackorder"),
            StockStatus::Other("onbackorder".to_string())
        );
    }

    #[test]
    fn stock_status_keeps_raw_value_on_the_wire() {
        let status: StockStatus = serde_json::from_str("\"onbackorder\"").unwrap();
        assert_eq!(status, StockStatus::Other("onbackorder".to_string()));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"onbackorder\"");
        assert_eq!(
            serde_json::to_string(&StockStatus::InStock).unwrap(),
            "\"instock\""
        );
    }

    #[test]
    fn with_categories_drops_duplicates() {
        let p = Product::new(ProductId::new(1), "Mug", StockStatus::InStock)
            .with_categories([cat(3), cat(1), cat(3)]);
        assert_eq!(p.category_ids(), &[cat(3), cat(1)]);
    }

    #[test]
    fn add_category_is_idempotent() {
        let mut p = Product::new(ProductId::new(1), "Mug", StockStatus::InStock);
        assert!(p.add_category(cat(5)));
        assert!(!p.add_category(cat(5)));
        assert_eq!(p.category_ids(), &[cat(5)]);
    }

    #[test]
    fn remove_category_reports_missing() {
        let mut p = Product::new(ProductId::new(1), "Mug", StockStatus::OutOfStock)
            .with_categories([cat(1), cat(2)]);
        assert!(p.remove_category(cat(2)));
        assert!(!p.remove_category(cat(2)));
        assert_eq!(p.category_ids(), &[cat(1)]);
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let p: Product = serde_json::from_str(r#"{"id": 9, "stock_status": "instock"}"#).unwrap();
        assert_eq!(p.id(), ProductId::new(9));
        assert!(p.category_ids().is_empty());
        assert_eq!(p.name(), "");
    }

    #[test]
    fn duplicate_category_ids_collapse_when_loaded() {
        let json = r#"{"id": 4, "stock_status": "instock", "category_ids": [3, 1, 3]}"#;
        let mut p: Product = serde_json::from_str(json).unwrap();

        assert_eq!(p.category_ids(), &[cat(3), cat(1)]);
        assert!(!p.add_category(cat(3)));
        assert!(p.remove_category(cat(3)));
        assert!(!p.has_category(cat(3)));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the category list never contains duplicates, whatever
            /// sequence of adds and removes is applied.
            #[test]
            fn category_list_stays_unique(
                ops in proptest::collection::vec((any::<bool>(), 0u64..8), 0..64)
            ) {
                let mut p = Product::new(ProductId::new(1), "p", StockStatus::InStock);
                for (add, id) in ops {
                    if add {
                        p.add_category(cat(id));
                    } else {
                        p.remove_category(cat(id));
                    }
                }
                let mut seen = std::collections::HashSet::new();
                for id in p.category_ids() {
                    prop_assert!(seen.insert(*id));
                }
            }
        }
    }
}
