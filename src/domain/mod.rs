// ==========================================
// Meat Production Analytics - domain layer
// ==========================================
// Entities and value types only; no storage or parsing logic here.
// ==========================================

pub mod alert;
pub mod catalog;
pub mod import_log;
pub mod production;
pub mod slaughter;
pub mod types;

pub use alert::{
    Alert, AlertInputs, AlertThresholds, FactoryKpi, FactorySteakTotals, FactoryWasteTotals, FactoryYieldTotals,
    MissingProduction,
};
pub use catalog::{ParsedProductData, ProductCatalogEntry, ProductRowPreview, ReferenceNames};
pub use import_log::{ImportLogEntry, ImportLogUpdate};
pub use production::{
    ParsedProductionData, ProductionHeader, ProductionLineRecord, ProductionRow, WorkOrder,
};
pub use slaughter::{ParsedSlaughterData, SlaughterBatchOption, SlaughterBatchRecord, SlaughterRow};
pub use types::{
    AlertCategory, AlertSeverity, Freshness, ImportStatus, KosherFamily, UploadType,
};
