//! Checks that a category id exists in the catalog taxonomy.

use stockcat_catalog::CatalogStore;
use stockcat_core::{CatalogResult, CategoryId};

/// Checks whether a category id is defined in the catalog taxonomy.
///
/// Looks at every category, including ones no product uses yet.
#[derive(Debug, Clone)]
pub struct CategoryExistenceCheck<S> {
    store: S,
}

impl<S: CatalogStore> CategoryExistenceCheck<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn exists(&self, id: CategoryId) -> CatalogResult<bool> {
        Ok(self.store.category_ids()?.contains(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockcat_catalog::InMemoryCatalogStore;

    #[test]
    fn empty_categories_count_as_existing() {
        let store = InMemoryCatalogStore::arc();
        store.add_category(CategoryId::new(2));
        let check = CategoryExistenceCheck::new(store.clone());

        assert!(check.exists(CategoryId::new(2)).unwrap());
        assert!(!check.exists(CategoryId::new(999)).unwrap());
    }

    #[test]
    fn reflects_taxonomy_changes() {
        let store = InMemoryCatalogStore::arc();
        store.add_category(CategoryId::new(5));
        let check = CategoryExistenceCheck::new(store.clone());
        assert!(check.exists(CategoryId::new(5)).unwrap());

        store.remove_category(CategoryId::new(5));
        assert!(!check.exists(CategoryId::new(5)).unwrap());
    }
}
