// ==========================================
// Meat Production Analytics - import layer
// ==========================================
// Spreadsheet ingestion: decode → grid → column detection → row coercion
// → parsed data → reference check → writes
// ==========================================

pub mod cell;
pub mod coercion;
pub mod column_detector;
pub mod error;
pub mod parse_options;
pub mod product_parser;
pub mod production_parser;
pub mod reference_validation;
pub mod slaughter_parser;
pub mod upload_service;
pub mod workbook_reader;

pub use cell::{CellValue, SheetGrid};
pub use column_detector::{ColumnDetector, ColumnLayout, ColumnSpec};
pub use error::{ImportError, ImportResult};
pub use parse_options::ParseOptions;
pub use product_parser::parse_product_sheet;
pub use production_parser::parse_production_sheet;
pub use reference_validation::{validate_references, ReferenceCheck};
pub use slaughter_parser::parse_slaughter_sheet;
pub use upload_service::{
    ProductionPreview, ProductionUploadRequest, ProductionUploadResult, ProductsUploadResult,
    SlaughterUploadResult, UploadService,
};
pub use workbook_reader::{decode_base64, read_base64_sheet, read_first_sheet};
