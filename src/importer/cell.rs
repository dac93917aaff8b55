// ==========================================
// Meat Production Analytics - raw sheet cells
// ==========================================
// A workbook sheet is reduced to a dense grid of CellValue anchored at
// A1, so column indices match what the user sees in the spreadsheet.
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl CellValue {
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Cell rendered as text: numbers without a trailing `.0`, dates as ISO.
    pub fn as_text(&self) -> String {
        self.to_string()
    }

    /// Lower-cased, trimmed text used for keyword matching.
    pub fn normalized(&self) -> String {
        self.as_text().trim().to_lowercase()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// One sheet as rows of cells. Rows may have different lengths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    rows: Vec<Vec<CellValue>>,
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl SheetGrid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, idx: usize) -> &[CellValue] {
        self.rows.get(idx).map(|r| r.as_slice()).unwrap_or(&[])
    }

    /// Cell at (row, col); out-of-range reads yield `Empty`.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn is_blank_row(&self, idx: usize) -> bool {
        self.row(idx).iter().all(CellValue::is_blank)
    }

    /// Normalized text of every cell in a row, for header detection.
    pub fn header_row(&self, idx: usize) -> Vec<String> {
        self.row(idx).iter().map(CellValue::normalized).collect()
    }
}
