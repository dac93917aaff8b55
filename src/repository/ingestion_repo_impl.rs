// ==========================================
// Meat Production Analytics - ingestion repository (rusqlite)
// ==========================================
// Natural-key upserts use ON CONFLICT ... DO UPDATE ... RETURNING id so a
// re-upload of the same day keeps its row id.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::import_log::{ImportLogEntry, ImportLogUpdate};
use crate::domain::production::{ProductionHeader, ProductionLineRecord, ProductionRow, WorkOrder};
use crate::domain::slaughter::{SlaughterBatchOption, SlaughterBatchRecord, SlaughterRow};
use crate::domain::types::{ImportStatus, UploadType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::ingestion_repo::IngestionRepository;
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct IngestionRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl IngestionRepositoryImpl {
    /// # Arguments
    /// - db_path: SQLite file path
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

fn parse_text_column<T: std::str::FromStr<Err = String>>(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
    })
}

fn map_import_log(row: &Row<'_>) -> rusqlite::Result<ImportLogEntry> {
    Ok(ImportLogEntry {
        id: row.get(0)?,
        batch_ref: row.get(1)?,
        file_name: row.get(2)?,
        upload_type: parse_text_column(row, 3)?,
        factory_id: row.get(4)?,
        status: parse_text_column(row, 5)?,
        rows_imported: row.get(6)?,
        error_details: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn map_slaughter_batch(row: &Row<'_>) -> rusqlite::Result<SlaughterBatchRecord> {
    Ok(SlaughterBatchRecord {
        id: row.get("id")?,
        factory_id: row.get("factory_id")?,
        date: row.get("date")?,
        cows_count: row.get("cows_count")?,
        bulls_count: row.get("bulls_count")?,
        halak_count: row.get("halak_count")?,
        muchshar_count: row.get("muchshar_count")?,
        waste_lungs: row.get("waste_lungs")?,
        waste_inner: row.get("waste_inner")?,
        waste_outer: row.get("waste_outer")?,
    })
}

#[async_trait]
impl IngestionRepository for IngestionRepositoryImpl {
    // ===== import log =====

    async fn insert_import_log(
        &self,
        batch_ref: &str,
        file_name: &str,
        upload_type: UploadType,
        factory_id: Option<i64>,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO import_logs (batch_ref, file_name, upload_type, factory_id, status)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                batch_ref,
                file_name,
                upload_type.as_str(),
                factory_id,
                ImportStatus::Processing.as_str()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn finalize_import_log(&self, log_id: i64, update: &ImportLogUpdate) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"
            UPDATE import_logs
            SET status = ?1, rows_imported = ?2, error_details = ?3
            WHERE id = ?4
            "#,
            params![
                update.status.as_str(),
                update.rows_imported as i64,
                update.error_details(),
                log_id
            ],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "import_logs".to_string(),
                id: log_id.to_string(),
            });
        }
        Ok(())
    }

    async fn list_import_logs(&self, limit: usize) -> RepositoryResult<Vec<ImportLogEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, batch_ref, file_name, upload_type, factory_id, status,
                   rows_imported, error_details, created_at
            FROM import_logs
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt
            .query_map(params![limit as i64], map_import_log)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ===== slaughter =====

    async fn upsert_slaughter_batch(&self, factory_id: i64, row: &SlaughterRow) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let id = conn.query_row(
            r#"
            INSERT INTO slaughter_batches (
                factory_id, date, cows_count, bulls_count,
                halak_count, muchshar_count,
                waste_lungs, waste_inner, waste_outer
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT (factory_id, date) DO UPDATE SET
                cows_count = excluded.cows_count,
                bulls_count = excluded.bulls_count,
                halak_count = excluded.halak_count,
                muchshar_count = excluded.muchshar_count,
                waste_lungs = excluded.waste_lungs,
                waste_inner = excluded.waste_inner,
                waste_outer = excluded.waste_outer,
                updated_at = datetime('now')
            RETURNING id
            "#,
            params![
                factory_id,
                row.date,
                row.cows_count,
                row.bulls_count,
                row.halak_count,
                row.muchshar_count,
                row.waste_lungs,
                row.waste_inner,
                row.waste_outer,
            ],
            |r| r.get(0),
        )?;
        Ok(id)
    }

    async fn list_slaughter_batches(&self, factory_id: i64) -> RepositoryResult<Vec<SlaughterBatchRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, factory_id, date, cows_count, bulls_count, halak_count,
                   muchshar_count, waste_lungs, waste_inner, waste_outer
            FROM slaughter_batches
            WHERE factory_id = ?1
            ORDER BY date ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![factory_id], map_slaughter_batch)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn list_unlinked_slaughter_batches(
        &self,
        factory_id: i64,
        limit: usize,
    ) -> RepositoryResult<Vec<SlaughterBatchOption>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT sb.id, sb.date,
                   (sb.cows_count + sb.bulls_count) AS total_heads,
                   sb.halak_count, sb.muchshar_count
            FROM slaughter_batches sb
            WHERE sb.factory_id = ?1
              AND NOT EXISTS (
                  SELECT 1 FROM production_sources ps
                  WHERE ps.slaughter_batch_id = sb.id
              )
            ORDER BY sb.date DESC
            LIMIT ?2
            "#,
        )?;
        let rows = stmt
            .query_map(params![factory_id, limit as i64], |r| {
                Ok(SlaughterBatchOption {
                    id: r.get(0)?,
                    date: r.get(1)?,
                    total_heads: r.get(2)?,
                    halak_count: r.get(3)?,
                    muchshar_count: r.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ===== production =====

    async fn upsert_work_order(
        &self,
        factory_id: i64,
        production_date: NaiveDate,
        header: &ProductionHeader,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let id = conn.query_row(
            r#"
            INSERT INTO work_orders (
                factory_id, production_date,
                halak_quarters_in, kosher_quarters_in,
                halak_weight_in_kg, kosher_weight_in_kg
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (factory_id, production_date) DO UPDATE SET
                halak_quarters_in = excluded.halak_quarters_in,
                kosher_quarters_in = excluded.kosher_quarters_in,
                halak_weight_in_kg = excluded.halak_weight_in_kg,
                kosher_weight_in_kg = excluded.kosher_weight_in_kg,
                updated_at = datetime('now')
            RETURNING id
            "#,
            params![
                factory_id,
                production_date,
                header.halak_quarters_in,
                header.kosher_quarters_in,
                header.halak_weight_in_kg,
                header.kosher_weight_in_kg,
            ],
            |r| r.get(0),
        )?;
        Ok(id)
    }

    async fn find_work_order(
        &self,
        factory_id: i64,
        production_date: NaiveDate,
    ) -> RepositoryResult<Option<WorkOrder>> {
        let conn = self.get_conn()?;
        let wo = conn
            .query_row(
                r#"
                SELECT id, factory_id, production_date,
                       halak_quarters_in, kosher_quarters_in,
                       halak_weight_in_kg, kosher_weight_in_kg
                FROM work_orders
                WHERE factory_id = ?1 AND production_date = ?2
                "#,
                params![factory_id, production_date],
                |r| {
                    Ok(WorkOrder {
                        id: r.get(0)?,
                        factory_id: r.get(1)?,
                        production_date: r.get(2)?,
                        header: ProductionHeader {
                            halak_quarters_in: r.get(3)?,
                            kosher_quarters_in: r.get(4)?,
                            halak_weight_in_kg: r.get(5)?,
                            kosher_weight_in_kg: r.get(6)?,
                        },
                    })
                },
            )
            .optional()?;
        Ok(wo)
    }

    async fn delete_production_lines(&self, work_order_id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n = conn.execute(
            "DELETE FROM production_records WHERE work_order_id = ?1",
            params![work_order_id],
        )?;
        Ok(n)
    }

    async fn insert_production_line(&self, work_order_id: i64, row: &ProductionRow) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO production_records (work_order_id, item_id, units, boxes, weight_kg)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![work_order_id, row.item_id, row.units, row.boxes, row.weight_kg],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn list_production_lines(&self, work_order_id: i64) -> RepositoryResult<Vec<ProductionLineRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, work_order_id, item_id, units, boxes, weight_kg
            FROM production_records
            WHERE work_order_id = ?1
            ORDER BY id ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![work_order_id], |r| {
                Ok(ProductionLineRecord {
                    id: r.get(0)?,
                    work_order_id: r.get(1)?,
                    item_id: r.get(2)?,
                    units: r.get(3)?,
                    boxes: r.get(4)?,
                    weight_kg: r.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ===== source link =====

    async fn delete_source_link(&self, work_order_id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n = conn.execute(
            "DELETE FROM production_sources WHERE work_order_id = ?1",
            params![work_order_id],
        )?;
        Ok(n)
    }

    async fn insert_source_link(&self, work_order_id: i64, slaughter_batch_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let n = conn.execute(
            r#"
            INSERT INTO production_sources (work_order_id, slaughter_batch_id)
            VALUES (?1, ?2)
            ON CONFLICT (slaughter_batch_id) DO NOTHING
            "#,
            params![work_order_id, slaughter_batch_id],
        )?;
        Ok(n > 0)
    }

    async fn find_source_link(&self, work_order_id: i64) -> RepositoryResult<Option<i64>> {
        let conn = self.get_conn()?;
        let id = conn
            .query_row(
                "SELECT slaughter_batch_id FROM production_sources WHERE work_order_id = ?1",
                params![work_order_id],
                |r| r.get(0),
            )
            .optional()?;
        Ok(id)
    }
}
