// ==========================================
// Meat Production Analytics - core library
// ==========================================
// Slaughter and production spreadsheet ingestion, reconciliation into
// SQLite, and alert/KPI aggregation.
// ==========================================

// i18n catalogues under ./locales
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// Modules
// ==========================================

// Domain: entities and value types
pub mod domain;

// Repository: data access
pub mod repository;

// Engine: alert rules and KPIs
pub mod engine;

// Importer: workbook decoding, parsing, upload pipeline
pub mod importer;

// Configuration (config_kv)
pub mod config;

// Database bootstrap (PRAGMAs, schema)
pub mod db;

pub mod logging;

pub mod i18n;

// API facade
pub mod api;

// Application state
pub mod app;

// ==========================================
// Re-exports
// ==========================================

pub use domain::types::{
    AlertCategory, AlertSeverity, Freshness, ImportStatus, KosherFamily, UploadType,
};

pub use domain::{
    Alert, FactoryKpi, ImportLogEntry, ProductionHeader, ProductionRow, SlaughterBatchOption,
    SlaughterRow,
};

pub use importer::{
    ProductionUploadRequest, ProductionUploadResult, ProductsUploadResult, SlaughterUploadResult,
    UploadService,
};

pub use api::{AlertApi, ApiError, ApiResult, UploadApi};

pub use app::{get_default_db_path, AppState};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "Meat Production Analytics";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
