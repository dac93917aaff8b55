// ==========================================
// Meat Production Analytics - product catalog repository trait
// ==========================================
// The ingestion core only reads the catalog, except for the catalog
// upload which inserts new products and never updates existing ones.
// ==========================================

use crate::domain::catalog::{ProductCatalogEntry, ReferenceNames};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use std::collections::HashSet;

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Which of `item_ids` exist in the catalog. One query for the whole set.
    async fn lookup_existing_item_ids(&self, item_ids: &[String]) -> RepositoryResult<HashSet<String>>;

    /// Kosher-family and active-customer names (English and Hebrew) to ids.
    async fn load_reference_names(&self) -> RepositoryResult<ReferenceNames>;

    /// Insert-or-ignore on item_id.
    ///
    /// # Returns
    /// - true: inserted
    /// - false: item_id already present, row skipped
    async fn insert_product_if_absent(&self, entry: &ProductCatalogEntry) -> RepositoryResult<bool>;
}
