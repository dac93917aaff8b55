// ==========================================
// Meat Production Analytics - product catalog sheet parser
// ==========================================
// Columns (default order): item_id | name_hebrew | name_foreign | kosher |
// department | X9 | steak | freshness | breed | bone_waste_% | customer
// Kosher and customer names resolve through lookups loaded by the caller.
// ==========================================

use crate::domain::catalog::{ParsedProductData, ProductRowPreview, ReferenceNames};
use crate::importer::cell::SheetGrid;
use crate::importer::coercion::{
    coerce_bool, coerce_optional_number, coerce_text, normalize_department, normalize_freshness,
    Categorical,
};
use crate::importer::column_detector::{ColumnDetector, ColumnSpec};
use crate::importer::parse_options::ParseOptions;
use tracing::debug;

const ITEM_ID: usize = 0;
const NAME_HEBREW: usize = 1;
const NAME_FOREIGN: usize = 2;
const KOSHER: usize = 3;
const DEPARTMENT: usize = 4;
const IS_ANATOMICAL: usize = 5;
const IS_STEAK: usize = 6;
const FRESHNESS: usize = 7;
const BREED: usize = 8;
const BONE_WASTE: usize = 9;
const CUSTOMER: usize = 10;

pub const PRODUCT_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { name: "item_id", default_index: 0, keywords: &["item", "barcode", "ean", "ברקוד", "קוד"] },
    ColumnSpec { name: "name_hebrew", default_index: 1, keywords: &["עברי", "hebrew", "name_heb"] },
    ColumnSpec {
        name: "name_foreign",
        default_index: 2,
        keywords: &["לועזי", "foreign", "name_for", "español", "nombre"],
    },
    ColumnSpec { name: "kosher", default_index: 3, keywords: &["כשרות", "kosher"] },
    ColumnSpec { name: "department", default_index: 4, keywords: &["מחלקה", "department", "dept"] },
    ColumnSpec { name: "is_anatomical", default_index: 5, keywords: &["x9", "anatomic", "אנטומי"] },
    ColumnSpec { name: "is_steak", default_index: 6, keywords: &["סטייק", "steak"] },
    ColumnSpec {
        name: "freshness",
        default_index: 7,
        keywords: &["ריענון", "freshness", "fresh", "frozen"],
    },
    ColumnSpec { name: "breed", default_index: 8, keywords: &["זן", "breed", "raza"] },
    ColumnSpec { name: "bone_waste", default_index: 9, keywords: &["עצם", "bone", "waste", "hueso"] },
    ColumnSpec { name: "customer", default_index: 10, keywords: &["לקוח", "customer", "cliente"] },
];

const DETECTOR: ColumnDetector = ColumnDetector::new(PRODUCT_COLUMNS);

/// Parse and validate a catalog sheet. Rows with errors are kept in the
/// output (for preview) but flagged; the upload skips them.
pub fn parse_product_sheet(
    grid: &SheetGrid,
    refs: &ReferenceNames,
    options: &ParseOptions,
) -> ParsedProductData {
    let msg = &options.messages;
    let mut parsed = ParsedProductData::default();

    if grid.len() < 2 {
        parsed.errors.push(msg.text("products.empty_file"));
        return parsed;
    }

    let layout = DETECTOR.detect(&grid.header_row(0));
    parsed.defaulted_columns = layout.defaulted_names();
    if options.strict_columns {
        parsed.warnings.extend(layout.defaulted_warnings(msg));
    }

    for i in 1..grid.len() {
        if grid.is_blank_row(i) {
            continue;
        }
        let cell = |slot: usize| grid.cell(i, layout.index(slot));

        let item_id = coerce_text(cell(ITEM_ID));
        let name_hebrew = coerce_text(cell(NAME_HEBREW));
        let kosher_name = coerce_text(cell(KOSHER));
        let department = normalize_department(&coerce_text(cell(DEPARTMENT)));
        let freshness = normalize_freshness(&coerce_text(cell(FRESHNESS)));
        let customer_name = coerce_text(cell(CUSTOMER));

        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if item_id.is_empty() {
            errors.push(msg.text("products.missing_item_id"));
        }
        if name_hebrew.is_empty() {
            errors.push(msg.text("products.missing_name_hebrew"));
        }

        let kosher_id = if kosher_name.is_empty() {
            errors.push(msg.text("products.missing_kosher"));
            None
        } else {
            let id = refs.kosher_id(&kosher_name);
            if id.is_none() {
                errors.push(msg.format("products.unknown_kosher", &[("value", &kosher_name)]));
            }
            id
        };

        let department_value = match &department {
            Categorical::Blank => String::new(),
            Categorical::Known(d) => d.clone(),
            Categorical::Unknown(d) => {
                warnings.push(msg.format("products.unknown_department", &[("value", d)]));
                d.clone()
            }
        };

        if freshness.is_unknown() {
            warnings.push(msg.format(
                "products.unknown_freshness",
                &[("value", &freshness.stored_value())],
            ));
        }

        let customer_id = if customer_name.is_empty() {
            None
        } else {
            let id = refs.customer_id(&customer_name);
            if id.is_none() {
                warnings.push(msg.format("products.unknown_customer", &[("value", &customer_name)]));
            }
            id
        };

        parsed.rows.push(ProductRowPreview {
            row: i + 1,
            item_id,
            name_hebrew,
            name_foreign: coerce_text(cell(NAME_FOREIGN)),
            kosher_name,
            kosher_id,
            department: department_value,
            is_anatomical: coerce_bool(cell(IS_ANATOMICAL)),
            is_steak: coerce_bool(cell(IS_STEAK)),
            freshness: freshness.stored_value(),
            breed: coerce_text(cell(BREED)),
            bone_waste_percentage: coerce_optional_number(cell(BONE_WASTE)),
            customer_name,
            customer_id,
            errors,
            warnings,
        });
    }

    debug!(
        rows = parsed.rows.len(),
        row_errors = parsed.error_count(),
        row_warnings = parsed.warning_count(),
        "parsed product sheet"
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::cell::CellValue;

    fn grid(rows: &[&[&str]]) -> SheetGrid {
        SheetGrid::new(
            rows.iter()
                .map(|r| {
                    r.iter()
                        .map(|c| {
                            if c.is_empty() {
                                CellValue::Empty
                            } else {
                                CellValue::Text(c.to_string())
                            }
                        })
                        .collect()
                })
                .collect(),
        )
    }

    fn refs() -> ReferenceNames {
        let mut refs = ReferenceNames::default();
        refs.kosher.insert("halak".into(), 1);
        refs.kosher.insert("חלק".into(), 1);
        refs.kosher.insert("muchshar".into(), 2);
        refs.customers.insert("acme".into(), 7);
        refs
    }

    const HEADER: &[&str] = &[
        "Barcode", "Hebrew name", "Nombre", "Kosher", "Department", "X9", "Steak",
        "Freshness", "Breed", "Bone %", "Customer",
    ];

    #[test]
    fn test_valid_row() {
        let g = grid(&[
            HEADER,
            &["729001", "אנטריקוט", "Entrecot", "Halak", "Carne", "x", "כן", "טרי", "Angus", "12.5", "ACME"],
        ]);
        let parsed = parse_product_sheet(&g, &refs(), &ParseOptions::default());
        assert_eq!(parsed.rows.len(), 1);
        let row = &parsed.rows[0];
        assert!(row.errors.is_empty(), "{:?}", row.errors);
        assert!(row.warnings.is_empty(), "{:?}", row.warnings);
        assert_eq!(row.kosher_id, Some(1));
        assert_eq!(row.customer_id, Some(7));
        assert_eq!(row.department, "carne");
        assert_eq!(row.freshness, "fresh");
        assert!(row.is_anatomical && row.is_steak);
        assert_eq!(row.bone_waste_percentage, Some(12.5));
        assert_eq!(row.row, 2);
        assert!(row.to_entry().is_some());
    }

    #[test]
    fn test_row_errors_and_warnings() {
        let g = grid(&[
            HEADER,
            &["", "", "", "Glatt", "Butchery", "", "", "chilly", "", "", "Nobody"],
        ]);
        let parsed = parse_product_sheet(&g, &refs(), &ParseOptions::default());
        let row = &parsed.rows[0];
        assert_eq!(row.errors.len(), 3);
        assert!(row.errors[2].contains("Glatt"));
        assert_eq!(row.warnings.len(), 3);
        assert_eq!(row.customer_id, None);
        assert_eq!(row.department, "butchery");
        assert!(row.to_entry().is_none());
        assert_eq!(parsed.error_count(), 1);
        assert_eq!(parsed.warning_count(), 1);
    }

    #[test]
    fn test_header_only() {
        let g = grid(&[HEADER]);
        let parsed = parse_product_sheet(&g, &refs(), &ParseOptions::default());
        assert_eq!(parsed.errors.len(), 1);
    }
}
