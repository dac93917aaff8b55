// ==========================================
// Meat Production Analytics - row coercion
// ==========================================
// Raw cells -> typed values. Every function here is total: bad input
// yields None / 0 / false / Unknown, never an error. Callers decide
// whether that is a row-level problem.
// ==========================================

use crate::domain::types::{Freshness, KosherFamily};
use crate::importer::cell::CellValue;
use chrono::{Duration, NaiveDate};

/// Spreadsheet date serials accepted from numeric cells (exclusive bounds, ~2009..2064).
pub const MIN_DATE_SERIAL: f64 = 40_000.0;
pub const MAX_DATE_SERIAL: f64 = 60_000.0;

/// Truthy tokens for boolean columns (compared lower-cased and trimmed).
pub const TRUTHY_TOKENS: &[&str] = &["true", "1", "yes", "כן", "x", "✓", "✔", "v"];

pub const VALID_DEPARTMENTS: &[&str] = &["carne", "carne con hueso", "menaker", "menudencias"];

// ==========================================
// Dates
// ==========================================

/// Spreadsheet serial (1900 date system) to a calendar date. The time fraction is dropped.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Coerce a cell to a calendar date.
///
/// Accepted: native dates, `YYYY-MM-DD`, `DD/MM/YYYY` (also `.` or `-`
/// separated, 1-2 digit day and month), and date serials strictly between
/// 40000 and 60000, given as numbers or numeric text.
pub fn coerce_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::Number(n) => serial_in_range(*n),
        CellValue::Text(s) => parse_date_text(s),
        CellValue::Empty | CellValue::Bool(_) => None,
    }
}

fn serial_in_range(n: f64) -> Option<NaiveDate> {
    if n > MIN_DATE_SERIAL && n < MAX_DATE_SERIAL {
        excel_serial_to_date(n)
    } else {
        None
    }
}

fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if is_iso_date(s) {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
    }

    if let Some((d, m, y)) = split_day_month_year(s) {
        return NaiveDate::from_ymd_opt(y, m, d);
    }

    s.parse::<f64>().ok().and_then(serial_in_range)
}

fn is_iso_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit())
}

// D{1,2} sep M{1,2} sep YYYY, sep one of / . -
fn split_day_month_year(s: &str) -> Option<(u32, u32, i32)> {
    let parts: Vec<&str> = s.split(['/', '.', '-']).collect();
    if parts.len() != 3 {
        return None;
    }
    let (d, m, y) = (parts[0], parts[1], parts[2]);
    let digits = |p: &str, min: usize, max: usize| {
        p.len() >= min && p.len() <= max && p.chars().all(|c| c.is_ascii_digit())
    };
    if !digits(d, 1, 2) || !digits(m, 1, 2) || !digits(y, 4, 4) {
        return None;
    }
    Some((d.parse().ok()?, m.parse().ok()?, y.parse().ok()?))
}

// ==========================================
// Numbers
// ==========================================

/// Blank -> 0, numeric -> value, anything unparseable -> 0.
pub fn coerce_number(cell: &CellValue) -> f64 {
    let n = match cell {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => {
            let t = s.trim();
            if t.is_empty() {
                0.0
            } else {
                t.parse::<f64>().unwrap_or(0.0)
            }
        }
        CellValue::Empty | CellValue::Bool(_) | CellValue::Date(_) => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Head counts are whole animals.
pub fn coerce_count(cell: &CellValue) -> i64 {
    coerce_number(cell).round() as i64
}

/// Like `coerce_number` but blank or unparseable is `None`.
pub fn coerce_optional_number(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

// ==========================================
// Booleans / text
// ==========================================

pub fn coerce_bool(cell: &CellValue) -> bool {
    match cell {
        CellValue::Bool(b) => *b,
        CellValue::Empty => false,
        other => TRUTHY_TOKENS.contains(&other.normalized().as_str()),
    }
}

pub fn coerce_text(cell: &CellValue) -> String {
    cell.as_text().trim().to_string()
}

// ==========================================
// Categorical values
// ==========================================

/// Result of normalizing a categorical cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Categorical<T> {
    Blank,
    Known(T),
    /// Unrecognized value, lower-cased and trimmed, kept as is.
    Unknown(String),
}

impl<T> Categorical<T> {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Categorical::Unknown(_))
    }
}

impl Categorical<Freshness> {
    pub fn stored_value(&self) -> String {
        match self {
            Categorical::Blank => String::new(),
            Categorical::Known(f) => f.as_str().to_string(),
            Categorical::Unknown(s) => s.clone(),
        }
    }
}

pub fn normalize_freshness(raw: &str) -> Categorical<Freshness> {
    let s = raw.trim().to_lowercase();
    match s.as_str() {
        "" => Categorical::Blank,
        "fresh" | "טרי" | "chilled" | "fresco" => Categorical::Known(Freshness::Fresh),
        "frozen" | "קפוא" | "congelado" => Categorical::Known(Freshness::Frozen),
        _ => Categorical::Unknown(s),
    }
}

pub fn normalize_kosher_family(raw: &str) -> Categorical<KosherFamily> {
    let s = raw.trim().to_lowercase();
    if s.is_empty() {
        Categorical::Blank
    } else if s.contains("halak") || s.contains("חלק") {
        Categorical::Known(KosherFamily::Halak)
    } else if s.contains("muchshar") || s.contains("kosher") || s.contains("מוכשר") || s.contains("כשר") {
        Categorical::Known(KosherFamily::Muchshar)
    } else {
        Categorical::Unknown(s)
    }
}

/// Departments are stored lower-cased; unknown ones pass through.
pub fn normalize_department(raw: &str) -> Categorical<String> {
    let s = raw.trim().to_lowercase();
    if s.is_empty() {
        Categorical::Blank
    } else if VALID_DEPARTMENTS.contains(&s.as_str()) {
        Categorical::Known(s)
    } else {
        Categorical::Unknown(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_formats_agree() {
        let expected = ymd(2024, 1, 15);
        assert_eq!(coerce_date(&text("2024-01-15")), Some(expected));
        assert_eq!(coerce_date(&text("15/01/2024")), Some(expected));
        assert_eq!(coerce_date(&text("15.1.2024")), Some(expected));
        assert_eq!(coerce_date(&CellValue::Number(45306.0)), Some(expected));
        assert_eq!(coerce_date(&text("45306")), Some(expected));
        assert_eq!(coerce_date(&CellValue::Date(expected)), Some(expected));
    }

    #[test]
    fn test_date_rejections() {
        assert_eq!(coerce_date(&CellValue::Empty), None);
        assert_eq!(coerce_date(&text("yesterday")), None);
        assert_eq!(coerce_date(&text("31/02/2024")), None);
        assert_eq!(coerce_date(&text("2024-13-01")), None);
        // serial bounds are exclusive
        assert_eq!(coerce_date(&CellValue::Number(40000.0)), None);
        assert_eq!(coerce_date(&CellValue::Number(60000.0)), None);
        assert_eq!(coerce_date(&CellValue::Number(120.0)), None);
    }

    #[test]
    fn test_serial_epoch() {
        assert_eq!(excel_serial_to_date(45306.75), Some(ymd(2024, 1, 15)));
        assert_eq!(excel_serial_to_date(f64::NAN), None);
    }

    #[test]
    fn test_number_fail_soft() {
        assert_eq!(coerce_number(&CellValue::Empty), 0.0);
        assert_eq!(coerce_number(&text(" 12.5 ")), 12.5);
        assert_eq!(coerce_number(&text("abc")), 0.0);
        assert_eq!(coerce_number(&text("NaN")), 0.0);
        assert_eq!(coerce_number(&CellValue::Number(7.0)), 7.0);
        assert_eq!(coerce_count(&text("99.6")), 100);
        assert_eq!(coerce_optional_number(&text("")), None);
        assert_eq!(coerce_optional_number(&text("3")), Some(3.0));
    }

    #[test]
    fn test_bool_tokens() {
        for token in ["TRUE", "1", "Yes", "כן", "x", "✓", "V"] {
            assert!(coerce_bool(&text(token)), "{} should be truthy", token);
        }
        assert!(coerce_bool(&CellValue::Number(1.0)));
        assert!(coerce_bool(&CellValue::Bool(true)));
        assert!(!coerce_bool(&text("no")));
        assert!(!coerce_bool(&text("0")));
        assert!(!coerce_bool(&CellValue::Empty));
    }

    #[test]
    fn test_freshness_normalization() {
        assert_eq!(normalize_freshness(" Fresh "), Categorical::Known(Freshness::Fresh));
        assert_eq!(normalize_freshness("טרי"), Categorical::Known(Freshness::Fresh));
        assert_eq!(normalize_freshness("קפוא"), Categorical::Known(Freshness::Frozen));
        assert_eq!(normalize_freshness(""), Categorical::Blank);
        let odd = normalize_freshness("Semi");
        assert!(odd.is_unknown());
        assert_eq!(odd.stored_value(), "semi");
    }

    #[test]
    fn test_kosher_family_and_department() {
        assert_eq!(normalize_kosher_family("Halak"), Categorical::Known(KosherFamily::Halak));
        assert_eq!(normalize_kosher_family("מוכשר"), Categorical::Known(KosherFamily::Muchshar));
        assert!(normalize_kosher_family("other").is_unknown());
        assert_eq!(normalize_department("Carne"), Categorical::Known("carne".to_string()));
        assert!(normalize_department("butchery").is_unknown());
    }
}
