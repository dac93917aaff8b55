// ==========================================
// Meat Production Analytics - reference validation
// ==========================================
// Unknown item ids are reported and excluded from insertion; they never
// block the rest of an upload.
// ==========================================

use crate::repository::catalog_repo::ProductCatalog;
use crate::repository::error::RepositoryResult;
use std::collections::HashSet;
use tracing::debug;

/// Partition of the distinct item ids of one production upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceCheck {
    pub known: HashSet<String>,
    /// In first-seen order, no duplicates
    pub unknown_item_ids: Vec<String>,
}

impl ReferenceCheck {
    /// Split `item_ids` against the set returned by the catalog.
    pub fn partition(item_ids: &[String], existing: &HashSet<String>) -> Self {
        let mut check = ReferenceCheck::default();
        let mut seen = HashSet::new();
        for id in item_ids {
            if !seen.insert(id.as_str()) {
                continue;
            }
            if existing.contains(id) {
                check.known.insert(id.clone());
            } else {
                check.unknown_item_ids.push(id.clone());
            }
        }
        check
    }

    pub fn is_known(&self, item_id: &str) -> bool {
        self.known.contains(item_id)
    }
}

/// One batched existence lookup for the whole id set.
pub async fn validate_references<C>(catalog: &C, item_ids: &[String]) -> RepositoryResult<ReferenceCheck>
where
    C: ProductCatalog + ?Sized,
{
    if item_ids.is_empty() {
        return Ok(ReferenceCheck::default());
    }
    let existing = catalog.lookup_existing_item_ids(item_ids).await?;
    let check = ReferenceCheck::partition(item_ids, &existing);
    debug!(
        known = check.known.len(),
        unknown = check.unknown_item_ids.len(),
        "item references checked"
    );
    Ok(check)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_partition_dedups_unknowns_in_order() {
        let existing: HashSet<String> = ids(&["A", "C"]).into_iter().collect();
        let check = ReferenceCheck::partition(&ids(&["Z", "A", "Y", "Z", "C"]), &existing);
        assert_eq!(check.unknown_item_ids, ids(&["Z", "Y"]));
        assert!(check.is_known("A"));
        assert!(check.is_known("C"));
        assert!(!check.is_known("Z"));
    }

    #[test]
    fn test_partition_empty_catalog() {
        let check = ReferenceCheck::partition(&ids(&["A"]), &HashSet::new());
        assert!(check.known.is_empty());
        assert_eq!(check.unknown_item_ids, ids(&["A"]));
    }
}
