// ==========================================
// Meat Production Analytics - production reports
// ==========================================
// A production report is an input header (quarters and kg per kosher
// family) plus a product-output table. The header is stored as a work
// order keyed by (factory, production_date); its lines are replaced
// wholesale on every re-upload.
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionHeader {
    pub halak_quarters_in: f64,
    pub kosher_quarters_in: f64,
    pub halak_weight_in_kg: f64,
    pub kosher_weight_in_kg: f64,
}

/// One product-output line of the table section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRow {
    pub item_id: String,
    pub units: f64,
    pub boxes: f64,
    pub weight_kg: f64,
    /// 1-based position in the source sheet
    pub row_number: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedProductionData {
    pub header: ProductionHeader,
    pub rows: Vec<ProductionRow>,
    pub production_date: Option<NaiveDate>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Product-table columns that kept their positional default
    pub defaulted_columns: Vec<String>,
}

impl ParsedProductionData {
    /// Distinct item ids in sheet order.
    pub fn distinct_item_ids(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.rows
            .iter()
            .filter(|r| seen.insert(r.item_id.as_str()))
            .map(|r| r.item_id.clone())
            .collect()
    }
}

/// Persisted production line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionLineRecord {
    pub id: i64,
    pub work_order_id: i64,
    pub item_id: String,
    pub units: f64,
    pub boxes: f64,
    pub weight_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: i64,
    pub factory_id: i64,
    pub production_date: NaiveDate,
    pub header: ProductionHeader,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(item: &str, n: usize) -> ProductionRow {
        ProductionRow {
            item_id: item.to_string(),
            units: 1.0,
            boxes: 1.0,
            weight_kg: 1.0,
            row_number: n,
        }
    }

    #[test]
    fn test_distinct_item_ids_keeps_first_occurrence_order() {
        let parsed = ParsedProductionData {
            rows: vec![row("B", 2), row("A", 3), row("B", 4)],
            ..Default::default()
        };
        assert_eq!(parsed.distinct_item_ids(), vec!["B".to_string(), "A".to_string()]);
    }
}
