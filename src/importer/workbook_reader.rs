// ==========================================
// Meat Production Analytics - workbook reader
// ==========================================
// Transport: base64 text -> raw bytes -> first sheet as SheetGrid.
// Format is sniffed from the leading bytes, not from the file name:
// - ZIP (xlsx/ods) and OLE2 (xls) go through calamine
// - any other UTF-8 payload is read as CSV
// ==========================================

use crate::importer::cell::{CellValue, SheetGrid};
use crate::importer::coercion::excel_serial_to_date;
use crate::importer::error::{ImportError, ImportResult};
use base64::Engine;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::io::Cursor;
use tracing::debug;

const ZIP_MAGIC: &[u8] = &[0x50, 0x4B, 0x03, 0x04];
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decode a base64 upload payload.
///
/// Surrounding whitespace and a `data:<mime>;base64,` prefix are accepted.
pub fn decode_base64(payload: &str) -> ImportResult<Vec<u8>> {
    let trimmed = payload.trim();
    let body = match trimmed.find(";base64,") {
        Some(pos) if trimmed.starts_with("data:") => &trimmed[pos + ";base64,".len()..],
        _ => trimmed,
    };
    let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::prelude::BASE64_STANDARD.decode(compact.as_bytes())?;
    if bytes.is_empty() {
        return Err(ImportError::EmptyFile);
    }
    Ok(bytes)
}

/// Read the first sheet of a workbook from raw bytes.
pub fn read_first_sheet(bytes: &[u8]) -> ImportResult<SheetGrid> {
    if bytes.is_empty() {
        return Err(ImportError::EmptyFile);
    }

    if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
        return read_spreadsheet(bytes);
    }

    let text = std::str::from_utf8(bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes))
        .map_err(|_| ImportError::UnsupportedFormat("binary data".to_string()))?;
    read_csv(text)
}

/// base64 payload straight to the first sheet.
pub fn read_base64_sheet(payload: &str) -> ImportResult<SheetGrid> {
    let bytes = decode_base64(payload)?;
    debug!(bytes = bytes.len(), "decoded upload payload");
    read_first_sheet(&bytes)
}

// ==========================================
// calamine
// ==========================================
fn read_spreadsheet(bytes: &[u8]) -> ImportResult<SheetGrid> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ImportError::NoSheets)?;
    let range = workbook.worksheet_range(&sheet_name)?;

    // Row 0 / column 0 is the first used cell, not A1.
    let rows: Vec<Vec<CellValue>> = range
        .rows()
        .map(|data_row| data_row.iter().map(convert_cell).collect())
        .collect();

    debug!(sheet = %sheet_name, rows = rows.len(), "read spreadsheet");
    Ok(SheetGrid::new(rows))
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match excel_serial_to_date(dt.as_f64()) {
            Some(d) => CellValue::Date(d),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

// ==========================================
// CSV
// ==========================================
fn read_csv(text: &str) -> ImportResult<SheetGrid> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(infer_text_cell).collect());
    }
    trim_to_used_range(&mut rows);

    debug!(rows = rows.len(), "read CSV sheet");
    Ok(SheetGrid::new(rows))
}

/// Drop leading blank rows and columns so a CSV grid starts at its first
/// used cell, like a calamine range does.
fn trim_to_used_range(rows: &mut Vec<Vec<CellValue>>) {
    let is_blank_row = |row: &Vec<CellValue>| row.iter().all(CellValue::is_blank);
    let first_used_row = rows.iter().position(|r| !is_blank_row(r)).unwrap_or(rows.len());
    rows.drain(..first_used_row);

    let first_used_col = rows
        .iter()
        .filter_map(|r| r.iter().position(|c| !c.is_blank()))
        .min()
        .unwrap_or(0);
    if first_used_col > 0 {
        for row in rows.iter_mut() {
            row.drain(..first_used_col.min(row.len()));
        }
    }
}

/// Type a delimited-text field the way spreadsheet programs do on open.
fn infer_text_cell(raw: &str) -> CellValue {
    let s = raw.trim();
    if s.is_empty() {
        return CellValue::Empty;
    }
    if s.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }
    if looks_numeric(s) {
        if let Ok(n) = s.parse::<f64>() {
            if n.is_finite() {
                return CellValue::Number(n);
            }
        }
    }
    CellValue::Text(s.to_string())
}

// Leading-zero codes ("0012") stay text so barcodes keep their digits.
fn looks_numeric(s: &str) -> bool {
    let digits = s.trim_start_matches(['-', '+']);
    let starts_ok = digits
        .chars()
        .next()
        .map(|c| c.is_ascii_digit() || c == '.')
        .unwrap_or(false);
    let leading_zero_code =
        digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.");
    starts_ok && !leading_zero_code
}
