// ==========================================
// Meat Production Analytics - slaughter report parser
// ==========================================
// Layout: Date | Cows | Bulls | Halak | Muchshar | Treif | Lungs | Inner | Outer
// Headers may be English, Spanish or Hebrew, in any order, or absent.
// Single pass, no state between rows.
// ==========================================

use crate::domain::slaughter::{ParsedSlaughterData, SlaughterRow};
use crate::importer::cell::SheetGrid;
use crate::importer::coercion::{coerce_count, coerce_date};
use crate::importer::column_detector::{ColumnDetector, ColumnSpec};
use crate::importer::parse_options::ParseOptions;
use tracing::debug;

const DATE: usize = 0;
const COWS: usize = 1;
const BULLS: usize = 2;
const HALAK: usize = 3;
const MUCHSHAR: usize = 4;
const TREIF: usize = 5;
const WASTE_LUNGS: usize = 6;
const WASTE_INNER: usize = 7;
const WASTE_OUTER: usize = 8;

// Order matters: "kosher" must not be claimed before "halak".
pub const SLAUGHTER_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { name: "date", default_index: 0, keywords: &["fecha", "date", "תאריך"] },
    ColumnSpec { name: "cows", default_index: 1, keywords: &["vaca", "cow", "פרות"] },
    ColumnSpec { name: "bulls", default_index: 2, keywords: &["toro", "bull", "שוורים"] },
    ColumnSpec { name: "halak", default_index: 3, keywords: &["halak", "חלק"] },
    ColumnSpec { name: "muchshar", default_index: 4, keywords: &["kosher", "muchshar", "מוכשר"] },
    ColumnSpec { name: "treif", default_index: 5, keywords: &["treif", "טריף"] },
    ColumnSpec { name: "waste_lungs", default_index: 6, keywords: &["pulmon", "lung", "ריאות"] },
    ColumnSpec { name: "waste_inner", default_index: 7, keywords: &["panza", "inner", "כרס"] },
    ColumnSpec { name: "waste_outer", default_index: 8, keywords: &["cajon", "outer", "כללי"] },
];

const DETECTOR: ColumnDetector = ColumnDetector::new(SLAUGHTER_COLUMNS);

/// Parse a slaughter sheet.
///
/// Rows failing a date or count check are skipped with an error; a kosher
/// split that does not add up to the head count is a warning and the row
/// is kept. Treif is read only for that check.
pub fn parse_slaughter_sheet(grid: &SheetGrid, options: &ParseOptions) -> ParsedSlaughterData {
    let msg = &options.messages;
    let mut parsed = ParsedSlaughterData::default();

    if grid.len() < 2 {
        parsed.errors.push(msg.text("slaughter.empty_file"));
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
        let row_number = i + 1;
        let row_label = row_number.to_string();
        let cell = |slot: usize| grid.cell(i, layout.index(slot));

        let date = match coerce_date(cell(DATE)) {
            Some(d) => d,
            None => {
                parsed.errors.push(msg.format(
                    "slaughter.invalid_date",
                    &[("row", &row_label), ("value", &cell(DATE).as_text())],
                ));
                continue;
            }
        };

        let cows = coerce_count(cell(COWS));
        let bulls = coerce_count(cell(BULLS));
        let halak = coerce_count(cell(HALAK));
        let muchshar = coerce_count(cell(MUCHSHAR));
        let treif = coerce_count(cell(TREIF));
        let waste_lungs = coerce_count(cell(WASTE_LUNGS));
        let waste_inner = coerce_count(cell(WASTE_INNER));
        let waste_outer = coerce_count(cell(WASTE_OUTER));
        let total_heads = cows + bulls;

        let counts = [
            (COWS, cows),
            (BULLS, bulls),
            (HALAK, halak),
            (MUCHSHAR, muchshar),
            (TREIF, treif),
            (WASTE_LUNGS, waste_lungs),
            (WASTE_INNER, waste_inner),
            (WASTE_OUTER, waste_outer),
        ];
        if let Some((slot, value)) = counts.iter().find(|(_, v)| *v < 0) {
            parsed.errors.push(msg.format(
                "slaughter.negative_value",
                &[
                    ("row", &row_label),
                    ("field", SLAUGHTER_COLUMNS[*slot].name),
                    ("value", &value.to_string()),
                ],
            ));
            continue;
        }

        if total_heads == 0 {
            parsed.errors.push(msg.format(
                "slaughter.zero_heads",
                &[
                    ("row", &row_label),
                    ("cows", &cows.to_string()),
                    ("bulls", &bulls.to_string()),
                ],
            ));
            continue;
        }

        let kosher_sum = halak + muchshar + treif;
        if kosher_sum != total_heads {
            parsed.warnings.push(msg.format(
                "slaughter.kosher_split_mismatch",
                &[
                    ("row", &row_label),
                    ("halak", &halak.to_string()),
                    ("muchshar", &muchshar.to_string()),
                    ("treif", &treif.to_string()),
                    ("sum", &kosher_sum.to_string()),
                    ("total", &total_heads.to_string()),
                ],
            ));
        }

        parsed.rows.push(SlaughterRow {
            date,
            cows_count: cows,
            bulls_count: bulls,
            total_heads,
            halak_count: halak,
            muchshar_count: muchshar,
            waste_lungs,
            waste_inner,
            waste_outer,
            row_number,
        });
    }

    debug!(
        rows = parsed.rows.len(),
        errors = parsed.errors.len(),
        warnings = parsed.warnings.len(),
        defaulted = parsed.defaulted_columns.len(),
        "parsed slaughter sheet"
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
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

    const HEADER: &[&str] = &[
        "Date", "Cows", "Bulls", "Halak", "Muchshar", "Treif", "Lungs", "Inner", "Outer",
    ];

    #[test]
    fn test_single_row_matches_split() {
        let g = grid(&[HEADER, &["2024-01-15", "120", "80", "150", "40", "10", "5", "3", "2"]]);
        let parsed = parse_slaughter_sheet(&g, &ParseOptions::default());
        assert!(parsed.errors.is_empty());
        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.rows.len(), 1);
        let row = &parsed.rows[0];
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(row.total_heads, 200);
        assert_eq!(row.derived_treif(), 10);
        assert_eq!(row.row_number, 2);
    }

    #[test]
    fn test_header_only_is_a_global_error() {
        let g = grid(&[HEADER]);
        let parsed = parse_slaughter_sheet(&g, &ParseOptions::default());
        assert!(parsed.rows.is_empty());
        assert_eq!(parsed.errors, vec!["File is empty or has only a header row".to_string()]);
    }

    #[test]
    fn test_zero_heads_and_bad_date_are_row_errors() {
        let g = grid(&[
            HEADER,
            &["2024-01-15", "0", "0", "0", "0", "0", "0", "0", "0"],
            &[],
            &["someday", "10", "0", "10", "0", "0", "0", "0", "0"],
            &["16/01/2024", "10", "0", "5", "5", "0", "0", "0", "0"],
        ]);
        let parsed = parse_slaughter_sheet(&g, &ParseOptions::default());
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.errors.len(), 2);
        assert!(parsed.errors[0].starts_with("Row 2:"));
        assert!(parsed.errors[0].contains("cows=0, bulls=0"));
        assert_eq!(parsed.errors[1], "Row 4: Invalid or missing date \"someday\"");
    }

    #[test]
    fn test_negative_count_is_a_row_error() {
        let g = grid(&[
            HEADER,
            &["2024-01-15", "-5", "5", "0", "0", "0", "0", "0", "0"],
            &["2024-01-16", "10", "0", "10", "0", "0", "0", "-2", "0"],
            &["2024-01-17", "10", "0", "10", "0", "0", "1", "0", "0"],
        ]);
        let parsed = parse_slaughter_sheet(&g, &ParseOptions::default());
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].row_number, 4);
        assert_eq!(
            parsed.errors,
            vec![
                "Row 2: cows cannot be negative (-5), skipping".to_string(),
                "Row 3: waste_inner cannot be negative (-2), skipping".to_string(),
            ]
        );
    }

    #[test]
    fn test_kosher_split_mismatch_is_a_warning() {
        let g = grid(&[HEADER, &["2024-01-15", "60", "40", "60", "20", "10", "0", "0", "0"]]);
        let parsed = parse_slaughter_sheet(&g, &ParseOptions::default());
        assert_eq!(parsed.rows.len(), 1);
        assert!(parsed.errors.is_empty());
        assert_eq!(
            parsed.warnings,
            vec!["Row 2: Kosher split mismatch: halak(60)+muchshar(20)+treif(10)=90 != total(100)".to_string()]
        );
    }

    #[test]
    fn test_spanish_header_reordered() {
        let g = grid(&[
            &["Vacas", "Toros", "Fecha", "Halak", "Kosher", "Treif", "Rej.Pulmon", "Rej.Panza", "Rej.Cajon"],
            &["70", "30", "2024-02-01", "80", "15", "5", "1", "2", "3"],
        ]);
        let parsed = parse_slaughter_sheet(&g, &ParseOptions::default());
        assert_eq!(parsed.rows.len(), 1);
        let row = &parsed.rows[0];
        assert_eq!(row.cows_count, 70);
        assert_eq!(row.bulls_count, 30);
        assert_eq!(row.muchshar_count, 15);
        assert_eq!((row.waste_lungs, row.waste_inner, row.waste_outer), (1, 2, 3));
        assert!(parsed.defaulted_columns.is_empty());
    }

    #[test]
    fn test_strict_mode_reports_defaulted_columns() {
        let g = grid(&[
            &["a", "b", "c", "d", "e", "f", "g", "h", "i"],
            &["2024-01-15", "120", "80", "150", "40", "10", "5", "3", "2"],
        ]);
        let lenient = parse_slaughter_sheet(&g, &ParseOptions::default());
        assert_eq!(lenient.defaulted_columns.len(), 9);
        assert!(lenient.warnings.is_empty());

        let strict = parse_slaughter_sheet(&g, &ParseOptions::new(Default::default(), true));
        assert_eq!(strict.warnings.len(), 9);
        assert_eq!(strict.rows, lenient.rows);
    }
}
