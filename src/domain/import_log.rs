// ==========================================
// Meat Production Analytics - import audit log
// ==========================================

use crate::domain::types::{ImportStatus, UploadType};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One row per upload attempt; created as `processing`, finalized once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportLogEntry {
    pub id: i64,
    pub batch_ref: String,
    pub file_name: String,
    pub upload_type: UploadType,
    pub factory_id: Option<i64>,
    pub status: ImportStatus,
    pub rows_imported: i64,
    pub error_details: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Values written when the log entry is finalized.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportLogUpdate {
    pub status: ImportStatus,
    pub rows_imported: usize,
    pub errors: Vec<String>,
}

impl ImportLogUpdate {
    /// Newline-joined error text, `None` when there were no errors.
    pub fn error_details(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.join("\n"))
        }
    }
}
