// ==========================================
// Meat Production Analytics - slaughter batches
// ==========================================
// One batch per (factory, calendar date). Treif is not stored: it is the
// remainder total_heads - halak_count - muchshar_count.
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A parsed slaughter-report row, ready to be upserted for a factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaughterRow {
    pub date: NaiveDate,
    pub cows_count: i64,
    pub bulls_count: i64,
    pub total_heads: i64,
    pub halak_count: i64,
    pub muchshar_count: i64,
    pub waste_lungs: i64,
    pub waste_inner: i64,
    pub waste_outer: i64,
    /// 1-based position in the source sheet
    pub row_number: usize,
}

impl SlaughterRow {
    pub fn total_waste(&self) -> i64 {
        self.waste_lungs + self.waste_inner + self.waste_outer
    }

    /// Heads accounted for by the kosher split plus the three waste categories.
    pub fn accounted_heads(&self) -> i64 {
        self.halak_count + self.muchshar_count + self.total_waste()
    }

    /// Derived treif remainder (never persisted).
    pub fn derived_treif(&self) -> i64 {
        self.total_heads - self.halak_count - self.muchshar_count
    }
}

/// Persisted slaughter batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaughterBatchRecord {
    pub id: i64,
    pub factory_id: i64,
    pub date: NaiveDate,
    pub cows_count: i64,
    pub bulls_count: i64,
    pub halak_count: i64,
    pub muchshar_count: i64,
    pub waste_lungs: i64,
    pub waste_inner: i64,
    pub waste_outer: i64,
}

impl SlaughterBatchRecord {
    pub fn total_heads(&self) -> i64 {
        self.cows_count + self.bulls_count
    }
}

/// An unlinked slaughter batch offered for production linking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaughterBatchOption {
    pub id: i64,
    pub date: NaiveDate,
    pub total_heads: i64,
    pub halak_count: i64,
    pub muchshar_count: i64,
}

/// Parser output: rows plus row-level problems, never a hard failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedSlaughterData {
    pub rows: Vec<SlaughterRow>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Logical columns that kept their positional default
    pub defaulted_columns: Vec<String>,
}
