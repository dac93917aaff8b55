// ==========================================
// Meat Production Analytics - ingestion repository trait
// ==========================================
// Persistence operations the upload pipeline needs. No business rules
// here: status, reconciliation and reference checks live in the importer.
// ==========================================

use crate::domain::import_log::{ImportLogEntry, ImportLogUpdate};
use crate::domain::production::{ProductionHeader, ProductionLineRecord, ProductionRow, WorkOrder};
use crate::domain::slaughter::{SlaughterBatchOption, SlaughterBatchRecord, SlaughterRow};
use crate::domain::types::UploadType;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use chrono::NaiveDate;

// ==========================================
// IngestionRepository Trait
// ==========================================
// Implementor: IngestionRepositoryImpl (rusqlite)
#[async_trait]
pub trait IngestionRepository: Send + Sync {
    // ===== import log =====

    /// Insert a log row with status `processing`.
    ///
    /// # Returns
    /// - id of the new row
    async fn insert_import_log(
        &self,
        batch_ref: &str,
        file_name: &str,
        upload_type: UploadType,
        factory_id: Option<i64>,
    ) -> RepositoryResult<i64>;

    /// Write the terminal status, row count and joined errors.
    async fn finalize_import_log(&self, log_id: i64, update: &ImportLogUpdate) -> RepositoryResult<()>;

    /// Newest entries first.
    async fn list_import_logs(&self, limit: usize) -> RepositoryResult<Vec<ImportLogEntry>>;

    // ===== slaughter =====

    /// Upsert on (factory_id, date); every quantity column is overwritten.
    async fn upsert_slaughter_batch(&self, factory_id: i64, row: &SlaughterRow) -> RepositoryResult<i64>;

    async fn list_slaughter_batches(&self, factory_id: i64) -> RepositoryResult<Vec<SlaughterBatchRecord>>;

    /// Batches of the factory not linked to any work order, newest first.
    async fn list_unlinked_slaughter_batches(
        &self,
        factory_id: i64,
        limit: usize,
    ) -> RepositoryResult<Vec<SlaughterBatchOption>>;

    // ===== production =====

    /// Upsert on (factory_id, production_date); all four header fields are replaced.
    ///
    /// # Returns
    /// - work order id
    async fn upsert_work_order(
        &self,
        factory_id: i64,
        production_date: NaiveDate,
        header: &ProductionHeader,
    ) -> RepositoryResult<i64>;

    async fn find_work_order(
        &self,
        factory_id: i64,
        production_date: NaiveDate,
    ) -> RepositoryResult<Option<WorkOrder>>;

    /// # Returns
    /// - number of deleted lines
    async fn delete_production_lines(&self, work_order_id: i64) -> RepositoryResult<usize>;

    async fn insert_production_line(&self, work_order_id: i64, row: &ProductionRow) -> RepositoryResult<i64>;

    async fn list_production_lines(&self, work_order_id: i64) -> RepositoryResult<Vec<ProductionLineRecord>>;

    // ===== source link =====

    async fn delete_source_link(&self, work_order_id: i64) -> RepositoryResult<usize>;

    /// Insert-or-ignore on the slaughter batch uniqueness.
    ///
    /// # Returns
    /// - true: link created
    /// - false: the batch was already linked, nothing written
    async fn insert_source_link(&self, work_order_id: i64, slaughter_batch_id: i64) -> RepositoryResult<bool>;

    /// Slaughter batch linked to a work order, if any.
    async fn find_source_link(&self, work_order_id: i64) -> RepositoryResult<Option<i64>>;
}
