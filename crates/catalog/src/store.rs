//! Catalog storage: the `CatalogStore` seam, an in-memory store and JSON snapshots.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use stockcat_core::{CatalogError, CatalogResult, CategoryId, ProductId};

use crate::product::Product;

/// Access to the external product catalog.
///
/// Every write is an independent read-modify-write of one product; there is
/// no transaction spanning several products and no optimistic concurrency
/// check (last write wins).
pub trait CatalogStore: Send + Sync {
    /// Read a single product.
    fn product(&self, id: ProductId) -> CatalogResult<Option<Product>>;

    /// Enumerate every product in the catalog.
    fn products(&self) -> CatalogResult<Vec<Product>>;

    /// Persist a product (its category list in particular).
    fn save(&self, product: &Product) -> CatalogResult<()>;

    /// All category ids defined in the taxonomy, including unused ones.
    fn category_ids(&self) -> CatalogResult<Vec<CategoryId>>;
}

impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    fn product(&self, id: ProductId) -> CatalogResult<Option<Product>> {
        (**self).product(id)
    }

    fn products(&self) -> CatalogResult<Vec<Product>> {
        (**self).products()
    }

    fn save(&self, product: &Product) -> CatalogResult<()> {
        (**self).save(product)
    }

    fn category_ids(&self) -> CatalogResult<Vec<CategoryId>> {
        (**self).category_ids()
    }
}

/// Serialized form of a whole catalog (taxonomy + products).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub categories: Vec<CategoryId>,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl CatalogSnapshot {
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| CatalogError::storage(format!("invalid catalog snapshot: {e}")))
    }

    pub fn to_json_pretty(&self) -> CatalogResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CatalogError::storage(format!("failed to encode catalog snapshot: {e}")))
    }
}

/// In-memory catalog for tests/dev.
///
/// Besides the `CatalogStore` contract it counts successful writes and can be
/// told to reject writes for specific products.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    products: RwLock<BTreeMap<ProductId, Product>>,
    categories: RwLock<BTreeSet<CategoryId>>,
    rejected_writes: RwLock<HashSet<ProductId>>,
    writes: AtomicU64,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        let store = Self::new();
        if let Ok(mut categories) = store.categories.write() {
            categories.extend(snapshot.categories);
        }
        if let Ok(mut products) = store.products.write() {
            for product in snapshot.products {
                products.insert(product.id(), product);
            }
        }
        store
    }

    pub fn snapshot(&self) -> CatalogResult<CatalogSnapshot> {
        let categories = self.category_ids()?;
        let products = self.products()?;
        Ok(CatalogSnapshot {
            categories,
            products,
        })
    }

    /// Add a category to the taxonomy.
    pub fn add_category(&self, id: CategoryId) {
        if let Ok(mut categories) = self.categories.write() {
            categories.insert(id);
        }
    }

    /// Delete a category from the taxonomy. Products keep their references.
    pub fn remove_category(&self, id: CategoryId) {
        if let Ok(mut categories) = self.categories.write() {
            categories.remove(&id);
        }
    }

    /// Insert or replace a product without counting it as a write.
    pub fn insert(&self, product: Product) {
        if let Ok(mut products) = self.products.write() {
            products.insert(product.id(), product);
        }
    }

    /// Make every subsequent `save` of `id` fail.
    pub fn reject_writes_for(&self, id: ProductId) {
        if let Ok(mut rejected) = self.rejected_writes.write() {
            rejected.insert(id);
        }
    }

    /// Number of successful `save` calls so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn product(&self, id: ProductId) -> CatalogResult<Option<Product>> {
        let products = self
            .products
            .read()
            .map_err(|_| CatalogError::storage("product lock poisoned"))?;
        Ok(products.get(&id).cloned())
    }

    fn products(&self) -> CatalogResult<Vec<Product>> {
        let products = self
            .products
            .read()
            .map_err(|_| CatalogError::storage("product lock poisoned"))?;
        Ok(products.values().cloned().collect())
    }

    fn save(&self, product: &Product) -> CatalogResult<()> {
        let rejected = self
            .rejected_writes
            .read()
            .map_err(|_| CatalogError::storage("rejection lock poisoned"))?
            .contains(&product.id());
        if rejected {
            return Err(CatalogError::write_rejected(product.id(), "write refused by store"));
        }

        let mut products = self
            .products
            .write()
            .map_err(|_| CatalogError::storage("product lock poisoned"))?;
        products.insert(product.id(), product.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);

        debug!(
            product_id = %product.id(),
            categories = ?product.category_ids(),
            "product saved"
        );
        Ok(())
    }

    fn category_ids(&self) -> CatalogResult<Vec<CategoryId>> {
        let categories = self
            .categories
            .read()
            .map_err(|_| CatalogError::storage("taxonomy lock poisoned"))?;
        Ok(categories.iter().copied().collect())
    }
}
