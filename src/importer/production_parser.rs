// ==========================================
// Meat Production Analytics - production report parser
// ==========================================
// Two sections on one sheet:
// 1. key/value header rows (label in the first used column, value in the
//    next): production date, quarters and kg entering production per
//    kosher family
// 2. product table introduced by a barcode/item header row
// Without a table header row the whole sheet below row 1 is the table.
// ==========================================

use crate::domain::production::{ParsedProductionData, ProductionRow};
use crate::importer::cell::SheetGrid;
use crate::importer::coercion::{coerce_date, coerce_number, coerce_text};
use crate::importer::column_detector::{ColumnDetector, ColumnLayout, ColumnSpec};
use crate::importer::parse_options::ParseOptions;
use tracing::debug;

const DATE_KEYWORDS: &[&str] = &["date", "fecha", "תאריך"];
const HALAK_KEYWORDS: &[&str] = &["halak", "חלק"];
const KOSHER_KEYWORDS: &[&str] = &["kosher", "muchshar", "מוכשר"];
const WEIGHT_KEYWORDS: &[&str] = &["kg", "peso", "משקל", "weight"];
const QUARTER_KEYWORDS: &[&str] = &["quarter", "cuarto", "רבע"];
const TABLE_MARKER_KEYWORDS: &[&str] = &["ean", "barcode", "item", "ברקוד", "קוד"];
const SUMMARY_ROW_KEYWORDS: &[&str] = &["total", "סה\"כ"];

const ITEM_ID: usize = 0;
const UNITS: usize = 1;
const BOXES: usize = 2;
const WEIGHT_KG: usize = 3;

pub const PRODUCT_TABLE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { name: "item_id", default_index: 0, keywords: TABLE_MARKER_KEYWORDS },
    ColumnSpec { name: "units", default_index: 1, keywords: &["unidad", "unit", "יחידות"] },
    ColumnSpec { name: "boxes", default_index: 2, keywords: &["caja", "box", "קופסאות", "קרטון"] },
    ColumnSpec { name: "weight_kg", default_index: 3, keywords: &["peso", "weight", "kg", "משקל"] },
];

const DETECTOR: ColumnDetector = ColumnDetector::new(PRODUCT_TABLE_COLUMNS);

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Which header metric a label row carries, if any.
///
/// A family keyword alone is not enough: the label must also name a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderMetric {
    HalakWeight,
    KosherWeight,
    HalakQuarters,
    KosherQuarters,
}

fn classify_header_label(label: &str) -> Option<HeaderMetric> {
    let halak = contains_any(label, HALAK_KEYWORDS);
    let kosher = contains_any(label, KOSHER_KEYWORDS);
    let weight = contains_any(label, WEIGHT_KEYWORDS);
    let quarters = contains_any(label, QUARTER_KEYWORDS);

    if halak && weight {
        Some(HeaderMetric::HalakWeight)
    } else if kosher && weight {
        Some(HeaderMetric::KosherWeight)
    } else if halak && quarters {
        Some(HeaderMetric::HalakQuarters)
    } else if kosher && quarters {
        Some(HeaderMetric::KosherQuarters)
    } else {
        None
    }
}

/// Parse a production sheet.
pub fn parse_production_sheet(grid: &SheetGrid, options: &ParseOptions) -> ParsedProductionData {
    let msg = &options.messages;
    let mut parsed = ParsedProductionData::default();

    // ===== header phase =====
    let mut table: Option<(usize, ColumnLayout)> = None;
    for i in 0..grid.len() {
        if grid.row(i).is_empty() {
            continue;
        }
        let label = grid.cell(i, 0).normalized();
        let value = grid.cell(i, 1);

        if parsed.production_date.is_none() && contains_any(&label, DATE_KEYWORDS) {
            parsed.production_date = coerce_date(value);
        }

        match classify_header_label(&label) {
            Some(HeaderMetric::HalakWeight) => parsed.header.halak_weight_in_kg = coerce_number(value),
            Some(HeaderMetric::KosherWeight) => parsed.header.kosher_weight_in_kg = coerce_number(value),
            Some(HeaderMetric::HalakQuarters) => parsed.header.halak_quarters_in = coerce_number(value),
            Some(HeaderMetric::KosherQuarters) => parsed.header.kosher_quarters_in = coerce_number(value),
            None => {}
        }

        if contains_any(&label, TABLE_MARKER_KEYWORDS) {
            table = Some((i + 1, DETECTOR.detect(&grid.header_row(i))));
            break;
        }
    }

    // ===== table phase =====
    let (start, layout) = match table {
        Some(found) => found,
        None => {
            let empty: [&str; 0] = [];
            (1, DETECTOR.detect(&empty))
        }
    };
    parsed.defaulted_columns = layout.defaulted_names();
    if options.strict_columns {
        parsed.warnings.extend(layout.defaulted_warnings(msg));
    }

    for i in start..grid.len() {
        if grid.row(i).is_empty() {
            continue;
        }
        let cell = |slot: usize| grid.cell(i, layout.index(slot));

        let item_id = coerce_text(cell(ITEM_ID));
        if item_id.is_empty() || item_id == "0" || item_id == "null" {
            continue;
        }
        if contains_any(&item_id.to_lowercase(), SUMMARY_ROW_KEYWORDS) {
            continue;
        }

        let weight_kg = coerce_number(cell(WEIGHT_KG));
        if weight_kg == 0.0 {
            continue;
        }
        let units = coerce_number(cell(UNITS));
        let boxes = coerce_number(cell(BOXES));

        let quantities = [(WEIGHT_KG, weight_kg), (UNITS, units), (BOXES, boxes)];
        if let Some((slot, value)) = quantities.iter().find(|(_, v)| *v < 0.0) {
            parsed.errors.push(msg.format(
                "production.negative_value",
                &[
                    ("row", &(i + 1).to_string()),
                    ("item", &item_id),
                    ("field", PRODUCT_TABLE_COLUMNS[*slot].name),
                    ("value", &value.to_string()),
                ],
            ));
            continue;
        }

        parsed.rows.push(ProductionRow {
            item_id,
            units,
            boxes,
            weight_kg,
            row_number: i + 1,
        });
    }

    if parsed.rows.is_empty() {
        parsed.errors.push(msg.text("production.no_valid_rows"));
    }

    debug!(
        rows = parsed.rows.len(),
        table_start = start,
        production_date = ?parsed.production_date,
        "parsed production sheet"
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::production::ProductionHeader;
    use crate::importer::cell::CellValue;
    use chrono::NaiveDate;

    fn grid(rows: &[&[&str]]) -> SheetGrid {
        SheetGrid::new(
            rows.iter()
                .map(|r| {
                    r.iter()
                        .map(|c| match c.parse::<f64>() {
                            Ok(n) => CellValue::Number(n),
                            Err(_) if c.is_empty() => CellValue::Empty,
                            Err(_) => CellValue::Text(c.to_string()),
                        })
                        .collect()
                })
                .collect(),
        )
    }

    #[test]
    fn test_header_block_and_table() {
        let g = grid(&[
            &["Date", "2024-01-15"],
            &["Halak quarters", "40"],
            &["Kosher quarters", "12"],
            &["Halak kg", "5200.5"],
            &["Kosher kg", "1500"],
            &[],
            &["EAN", "Units", "Boxes", "Weight kg"],
            &["7290001", "10", "2", "55.5"],
            &["7290002", "4", "1", "0"],
            &["Total", "14", "3", "55.5"],
            &["7290003", "", "", "12"],
        ]);
        let parsed = parse_production_sheet(&g, &ParseOptions::default());
        assert_eq!(parsed.production_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(parsed.header.halak_quarters_in, 40.0);
        assert_eq!(parsed.header.kosher_quarters_in, 12.0);
        assert_eq!(parsed.header.halak_weight_in_kg, 5200.5);
        assert_eq!(parsed.header.kosher_weight_in_kg, 1500.0);
        assert!(parsed.errors.is_empty());

        let ids: Vec<&str> = parsed.rows.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, vec!["7290001", "7290003"]);
        assert_eq!(parsed.rows[0].row_number, 8);
        assert_eq!(parsed.rows[1].units, 0.0);
        assert!(parsed.defaulted_columns.is_empty());
    }

    #[test]
    fn test_bare_family_label_is_not_a_metric() {
        let g = grid(&[
            &["Halak", "999"],
            &["Barcode", "Unidades", "Cajas", "Peso"],
            &["1", "1", "1", "1"],
        ]);
        let parsed = parse_production_sheet(&g, &ParseOptions::default());
        assert_eq!(parsed.header, ProductionHeader::default());
    }

    #[test]
    fn test_reordered_table_columns() {
        let g = grid(&[
            &["קוד", "משקל", "יחידות", "קרטון"],
            &["A1", "20", "5", "1"],
        ]);
        let parsed = parse_production_sheet(&g, &ParseOptions::default());
        assert_eq!(parsed.rows.len(), 1);
        let row = &parsed.rows[0];
        assert_eq!((row.weight_kg, row.units, row.boxes), (20.0, 5.0, 1.0));
    }

    #[test]
    fn test_fallback_table_start() {
        let g = grid(&[
            &["Daily output"],
            &["A1", "5", "1", "20"],
            &["null", "5", "1", "20"],
            &["0", "5", "1", "20"],
            &["סה\"כ", "5", "1", "20"],
        ]);
        let parsed = parse_production_sheet(&g, &ParseOptions::default());
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].row_number, 2);
        assert_eq!(parsed.defaulted_columns.len(), 4);
    }

    #[test]
    fn test_no_rows_is_one_error() {
        let g = grid(&[&["EAN", "Units", "Boxes", "Weight"], &["A1", "1", "1", "0"]]);
        let parsed = parse_production_sheet(&g, &ParseOptions::default());
        assert!(parsed.rows.is_empty());
        assert_eq!(parsed.errors, vec!["No valid product rows found in file".to_string()]);
    }

    #[test]
    fn test_first_parseable_date_wins() {
        let g = grid(&[
            &["Fecha", "pending"],
            &["Date", "20/01/2024"],
            &["Date", "2024-02-01"],
            &["Item", "Units", "Boxes", "Kg"],
            &["A1", "1", "1", "1"],
        ]);
        let parsed = parse_production_sheet(&g, &ParseOptions::default());
        assert_eq!(parsed.production_date, NaiveDate::from_ymd_opt(2024, 1, 20));
    }

    #[test]
    fn test_negative_quantity_is_a_row_error() {
        let g = grid(&[
            &["EAN", "Units", "Boxes", "Weight kg"],
            &["7290001", "2", "1", "-5"],
            &["7290002", "-1", "1", "10"],
            &["7290003", "2", "1", "10"],
        ]);
        let parsed = parse_production_sheet(&g, &ParseOptions::default());
        let ids: Vec<&str> = parsed.rows.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, vec!["7290003"]);
        assert_eq!(
            parsed.errors,
            vec![
                "Row 2 (item 7290001): weight_kg cannot be negative (-5), skipping".to_string(),
                "Row 3 (item 7290002): units cannot be negative (-1), skipping".to_string(),
            ]
        );
    }
}
