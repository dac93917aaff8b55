// ==========================================
// Meat Production Analytics - product catalog
// ==========================================
// Reference data the ingestion core reads; only the catalog upload
// writes it, and only with insert-or-ignore semantics.
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCatalogEntry {
    pub item_id: String,
    pub name_hebrew: String,
    pub name_foreign: Option<String>,
    pub kosher_id: i64,
    pub department: Option<String>,
    /// X9: anatomical primal cut, denominator of steak yield
    pub is_anatomical: bool,
    pub is_steak: bool,
    pub freshness: Option<String>,
    pub breed: Option<String>,
    pub bone_waste_percentage: Option<f64>,
    pub customer_id: Option<i64>,
}

/// Catalog spreadsheet row after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRowPreview {
    pub row: usize,
    pub item_id: String,
    pub name_hebrew: String,
    pub name_foreign: String,
    pub kosher_name: String,
    pub kosher_id: Option<i64>,
    pub department: String,
    pub is_anatomical: bool,
    pub is_steak: bool,
    pub freshness: String,
    pub breed: String,
    pub bone_waste_percentage: Option<f64>,
    pub customer_name: String,
    pub customer_id: Option<i64>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ProductRowPreview {
    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn to_entry(&self) -> Option<ProductCatalogEntry> {
        if self.has_error() {
            return None;
        }
        let opt = |s: &str| if s.is_empty() { None } else { Some(s.to_string()) };
        Some(ProductCatalogEntry {
            item_id: self.item_id.clone(),
            name_hebrew: self.name_hebrew.clone(),
            name_foreign: opt(&self.name_foreign),
            kosher_id: self.kosher_id?,
            department: opt(&self.department),
            is_anatomical: self.is_anatomical,
            is_steak: self.is_steak,
            freshness: opt(&self.freshness),
            breed: opt(&self.breed),
            bone_waste_percentage: self.bone_waste_percentage,
            customer_id: self.customer_id,
        })
    }
}

/// Name lookups used to resolve kosher and customer columns.
/// Keys are lower-cased and trimmed; both the foreign and Hebrew name map to the id.
#[derive(Debug, Clone, Default)]
pub struct ReferenceNames {
    pub kosher: std::collections::HashMap<String, i64>,
    pub customers: std::collections::HashMap<String, i64>,
}

impl ReferenceNames {
    pub fn kosher_id(&self, name: &str) -> Option<i64> {
        self.kosher.get(&name.trim().to_lowercase()).copied()
    }

    pub fn customer_id(&self, name: &str) -> Option<i64> {
        self.customers.get(&name.trim().to_lowercase()).copied()
    }
}

/// Catalog parser output. `errors` holds sheet-level problems only;
/// row problems live on each row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedProductData {
    pub rows: Vec<ProductRowPreview>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub defaulted_columns: Vec<String>,
}

impl ParsedProductData {
    pub fn error_count(&self) -> usize {
        self.rows.iter().filter(|r| r.has_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.rows.iter().filter(|r| !r.warnings.is_empty()).count()
    }
}
