// ==========================================
// Meat Production Analytics - importer errors
// ==========================================
// Only structural problems are errors. Row-level problems are returned
// as data alongside the parsed rows.
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// Structural import failure: the upload is aborted before any row is read.
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== transport =====
    #[error("file payload is not valid base64: {0}")]
    InvalidEncoding(String),

    #[error("file is empty")]
    EmptyFile,

    // ===== workbook =====
    #[error("unsupported file format: {0} (expected .xlsx, .xls or .csv)")]
    UnsupportedFormat(String),

    #[error("workbook could not be read: {0}")]
    ExcelParseError(String),

    #[error("workbook has no sheets")]
    NoSheets,

    #[error("CSV could not be read: {0}")]
    CsvParseError(String),

    // ===== reference data =====
    #[error("reference lookup failed: {0}")]
    Storage(#[from] RepositoryError),
}

impl From<base64::DecodeError> for ImportError {
    fn from(err: base64::DecodeError) -> Self {
        ImportError::InvalidEncoding(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

pub type ImportResult<T> = Result<T, ImportError>;
