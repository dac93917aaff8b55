// ==========================================
// Meat Production Analytics - upload service
// ==========================================
// Flow per upload: log(processing) → decode → parse → reference check →
// natural-key writes → log(final status)
// ==========================================
// Setup-step storage failures abort the upload; per-row storage
// failures degrade that row to an error and the loop continues.
// ==========================================

use crate::domain::catalog::ParsedProductData;
use crate::domain::import_log::ImportLogUpdate;
use crate::domain::production::{ParsedProductionData, ProductionHeader, ProductionRow};
use crate::domain::slaughter::{ParsedSlaughterData, SlaughterRow};
use crate::domain::types::{ImportStatus, UploadType};
use crate::i18n::Messages;
use crate::importer::error::ImportResult;
use crate::importer::parse_options::ParseOptions;
use crate::importer::product_parser::parse_product_sheet;
use crate::importer::production_parser::parse_production_sheet;
use crate::importer::reference_validation::{validate_references, ReferenceCheck};
use crate::importer::slaughter_parser::parse_slaughter_sheet;
use crate::importer::workbook_reader::read_base64_sheet;
use crate::repository::catalog_repo::ProductCatalog;
use crate::repository::error::RepositoryError;
use crate::repository::ingestion_repo::IngestionRepository;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// Results
// ==========================================

/// `success` is true when at least one row was stored; `status` is the
/// finer-grained value written to the import log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaughterUploadResult {
    pub success: bool,
    pub batch_ref: String,
    pub rows_inserted: usize,
    pub rows_skipped: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub status: ImportStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionUploadResult {
    pub success: bool,
    pub batch_ref: String,
    pub work_order_id: Option<i64>,
    pub production_date: Option<NaiveDate>,
    pub rows_inserted: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub unknown_item_ids: Vec<String>,
    pub status: ImportStatus,
}

/// Catalog upload: `skipped` counts item ids that were already present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductsUploadResult {
    pub success: bool,
    pub batch_ref: String,
    pub inserted: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
    pub status: ImportStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionPreview {
    pub header: ProductionHeader,
    pub rows: Vec<ProductionRow>,
    pub production_date: Option<NaiveDate>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub unknown_item_ids: Vec<String>,
}

/// Caller-supplied parameters of a production upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionUploadRequest {
    pub factory_id: i64,
    pub file_name: String,
    /// base64 workbook, optionally with a data-URL prefix
    pub payload: String,
    /// Overrides the date parsed from the file
    pub production_date: Option<NaiveDate>,
    pub slaughter_batch_id: Option<i64>,
}

impl SlaughterUploadResult {
    fn failed(batch_ref: String, errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            success: false,
            batch_ref,
            rows_inserted: 0,
            rows_skipped: 0,
            errors,
            warnings,
            status: ImportStatus::Error,
        }
    }
}

impl ProductionUploadResult {
    fn failed(batch_ref: String, errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            success: false,
            batch_ref,
            work_order_id: None,
            production_date: None,
            rows_inserted: 0,
            errors,
            warnings,
            unknown_item_ids: Vec::new(),
            status: ImportStatus::Error,
        }
    }
}

impl ProductsUploadResult {
    fn failed(batch_ref: String, skipped: usize, errors: Vec<String>) -> Self {
        Self {
            success: false,
            batch_ref,
            inserted: 0,
            skipped,
            errors,
            status: ImportStatus::Error,
        }
    }
}

/// Outcome of the production setup steps (reference check, header upsert,
/// child deletion, source link).
struct ProductionSetup {
    work_order_id: i64,
    references: ReferenceCheck,
    link_warning: Option<String>,
}

/// Warning per row whose kosher split plus waste does not add up to its heads.
pub fn accounting_warnings(rows: &[SlaughterRow], messages: &Messages) -> Vec<String> {
    rows.iter()
        .filter(|r| r.accounted_heads() != r.total_heads)
        .map(|r| {
            messages.format(
                "slaughter.accounting_mismatch",
                &[
                    ("row", &r.row_number.to_string()),
                    ("date", &r.date.to_string()),
                    ("total", &r.total_heads.to_string()),
                    ("accounted", &r.accounted_heads().to_string()),
                ],
            )
        })
        .collect()
}

// ==========================================
// UploadService
// ==========================================
pub struct UploadService<R, C>
where
    R: IngestionRepository,
    C: ProductCatalog,
{
    ingestion_repo: Arc<R>,
    catalog: Arc<C>,
}

impl<R, C> UploadService<R, C>
where
    R: IngestionRepository,
    C: ProductCatalog,
{
    pub fn new(ingestion_repo: Arc<R>, catalog: Arc<C>) -> Self {
        Self {
            ingestion_repo,
            catalog,
        }
    }

    // ==========================================
    // Previews (no writes)
    // ==========================================

    pub fn preview_slaughter(&self, payload: &str, options: &ParseOptions) -> ImportResult<ParsedSlaughterData> {
        let grid = read_base64_sheet(payload)?;
        let mut parsed = parse_slaughter_sheet(&grid, options);
        let extra = accounting_warnings(&parsed.rows, &options.messages);
        parsed.warnings.extend(extra);
        Ok(parsed)
    }

    /// A catalog lookup failure is logged and leaves the unknown list empty.
    pub async fn preview_production(&self, payload: &str, options: &ParseOptions) -> ImportResult<ProductionPreview> {
        let grid = read_base64_sheet(payload)?;
        let parsed = parse_production_sheet(&grid, options);

        let unknown_item_ids = match validate_references(self.catalog.as_ref(), &parsed.distinct_item_ids()).await {
            Ok(check) => check.unknown_item_ids,
            Err(e) => {
                warn!(error = %e, "catalog lookup failed during preview, skipping reference check");
                Vec::new()
            }
        };

        Ok(ProductionPreview {
            header: parsed.header,
            rows: parsed.rows,
            production_date: parsed.production_date,
            errors: parsed.errors,
            warnings: parsed.warnings,
            unknown_item_ids,
        })
    }

    pub async fn preview_products(&self, payload: &str, options: &ParseOptions) -> ImportResult<ParsedProductData> {
        let grid = read_base64_sheet(payload)?;
        let names = self.catalog.load_reference_names().await?;
        Ok(parse_product_sheet(&grid, &names, options))
    }

    // ==========================================
    // Slaughter upload
    // ==========================================

    /// Upsert every parsed row on (factory, date).
    #[instrument(skip(self, payload, options), fields(batch_ref))]
    pub async fn upload_slaughter(
        &self,
        factory_id: i64,
        file_name: &str,
        payload: &str,
        options: &ParseOptions,
    ) -> SlaughterUploadResult {
        let msg = &options.messages;
        let batch_ref = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_ref", batch_ref.as_str());
        info!(factory_id, file_name, "slaughter upload started");

        let log_id = match self
            .ingestion_repo
            .insert_import_log(&batch_ref, file_name, UploadType::Slaughter, Some(factory_id))
            .await
        {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "import log could not be created");
                return SlaughterUploadResult::failed(batch_ref, vec![e.to_string()], Vec::new());
            }
        };

        let parsed = match read_base64_sheet(payload) {
            Ok(grid) => parse_slaughter_sheet(&grid, options),
            Err(e) => {
                warn!(error = %e, "slaughter workbook rejected");
                let errors = self.close_failed(log_id, vec![e.to_string()]).await;
                return SlaughterUploadResult::failed(batch_ref, errors, Vec::new());
            }
        };

        if parsed.rows.is_empty() {
            let errors = if parsed.errors.is_empty() {
                vec![msg.text("slaughter.no_valid_rows")]
            } else {
                parsed.errors
            };
            warn!(errors = errors.len(), "slaughter file has no valid rows");
            let errors = self.close_failed(log_id, errors).await;
            return SlaughterUploadResult::failed(batch_ref, errors, parsed.warnings);
        }

        let mut errors = parsed.errors.clone();
        let mut warnings = parsed.warnings.clone();
        warnings.extend(accounting_warnings(&parsed.rows, msg));

        let mut inserted = 0usize;
        let mut skipped = 0usize;
        for row in &parsed.rows {
            match self.ingestion_repo.upsert_slaughter_batch(factory_id, row).await {
                Ok(batch_id) => {
                    debug!(row_number = row.row_number, batch_id, date = %row.date, "slaughter batch stored");
                    inserted += 1;
                }
                Err(e) => {
                    warn!(row_number = row.row_number, date = %row.date, error = %e, "slaughter row not stored");
                    errors.push(msg.format(
                        "slaughter.storage_failed",
                        &[("date", &row.date.to_string()), ("error", &e.to_string())],
                    ));
                    skipped += 1;
                }
            }
        }

        let status = ImportStatus::resolve(inserted, parsed.rows.len(), errors.len(), 0);
        self.close(log_id, status, inserted, &mut errors).await;
        info!(status = status.as_str(), inserted, skipped, "slaughter upload finished");

        SlaughterUploadResult {
            success: inserted > 0,
            batch_ref,
            rows_inserted: inserted,
            rows_skipped: skipped,
            errors,
            warnings,
            status,
        }
    }

    // ==========================================
    // Production upload
    // ==========================================

    /// Upsert the work order, replace its lines and source link, insert
    /// known lines.
    #[instrument(skip(self, request, options), fields(factory_id = request.factory_id, batch_ref))]
    pub async fn upload_production(
        &self,
        request: &ProductionUploadRequest,
        options: &ParseOptions,
    ) -> ProductionUploadResult {
        let msg = &options.messages;
        let batch_ref = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_ref", batch_ref.as_str());
        info!(file_name = %request.file_name, "production upload started");

        let log_id = match self
            .ingestion_repo
            .insert_import_log(
                &batch_ref,
                &request.file_name,
                UploadType::Production,
                Some(request.factory_id),
            )
            .await
        {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "import log could not be created");
                return ProductionUploadResult::failed(batch_ref, vec![e.to_string()], Vec::new());
            }
        };

        let parsed = match read_base64_sheet(&request.payload) {
            Ok(grid) => parse_production_sheet(&grid, options),
            Err(e) => {
                warn!(error = %e, "production workbook rejected");
                let errors = self.close_failed(log_id, vec![e.to_string()]).await;
                return ProductionUploadResult::failed(batch_ref, errors, Vec::new());
            }
        };

        if parsed.rows.is_empty() {
            let errors = if parsed.errors.is_empty() {
                vec![msg.text("production.no_valid_rows")]
            } else {
                parsed.errors
            };
            warn!("production file has no product rows");
            let errors = self.close_failed(log_id, errors).await;
            return ProductionUploadResult::failed(batch_ref, errors, parsed.warnings);
        }

        let Some(production_date) = request.production_date.or(parsed.production_date) else {
            warn!("no production date selected or found in file");
            let errors = self.close_failed(log_id, vec![msg.text("production.missing_date")]).await;
            return ProductionUploadResult::failed(batch_ref, errors, parsed.warnings);
        };

        let setup = match self
            .prepare_work_order(request, production_date, &parsed, msg)
            .await
        {
            Ok(setup) => setup,
            Err(e) => {
                error!(error = %e, "production setup failed, upload aborted");
                let errors = self.close_failed(log_id, vec![e.to_string()]).await;
                return ProductionUploadResult::failed(batch_ref, errors, parsed.warnings);
            }
        };

        let mut errors = parsed.errors.clone();
        let mut warnings = parsed.warnings.clone();
        warnings.extend(setup.link_warning);

        let mut inserted = 0usize;
        for row in parsed.rows.iter().filter(|r| setup.references.is_known(&r.item_id)) {
            match self
                .ingestion_repo
                .insert_production_line(setup.work_order_id, row)
                .await
            {
                Ok(_) => inserted += 1,
                Err(e) => {
                    warn!(row_number = row.row_number, item_id = %row.item_id, error = %e, "production line not stored");
                    errors.push(msg.format(
                        "production.storage_failed",
                        &[("item", &row.item_id), ("error", &e.to_string())],
                    ));
                }
            }
        }

        let unknown_item_ids = setup.references.unknown_item_ids;
        let status = ImportStatus::resolve(inserted, parsed.rows.len(), errors.len(), unknown_item_ids.len());
        self.close(log_id, status, inserted, &mut errors).await;
        info!(
            status = status.as_str(),
            work_order_id = setup.work_order_id,
            inserted,
            unknown = unknown_item_ids.len(),
            "production upload finished"
        );

        ProductionUploadResult {
            success: inserted > 0,
            batch_ref,
            work_order_id: Some(setup.work_order_id),
            production_date: Some(production_date),
            rows_inserted: inserted,
            errors,
            warnings,
            unknown_item_ids,
            status,
        }
    }

    /// Setup steps; any error here aborts the upload.
    async fn prepare_work_order(
        &self,
        request: &ProductionUploadRequest,
        production_date: NaiveDate,
        parsed: &ParsedProductionData,
        msg: &Messages,
    ) -> Result<ProductionSetup, RepositoryError> {
        let references = validate_references(self.catalog.as_ref(), &parsed.distinct_item_ids()).await?;

        let work_order_id = self
            .ingestion_repo
            .upsert_work_order(request.factory_id, production_date, &parsed.header)
            .await?;

        let removed_lines = self.ingestion_repo.delete_production_lines(work_order_id).await?;
        self.ingestion_repo.delete_source_link(work_order_id).await?;
        debug!(work_order_id, removed_lines, "previous lines and link cleared");

        let mut link_warning = None;
        if let Some(batch_id) = request.slaughter_batch_id {
            let linked = self
                .ingestion_repo
                .insert_source_link(work_order_id, batch_id)
                .await?;
            if !linked {
                warn!(work_order_id, slaughter_batch_id = batch_id, "slaughter batch already linked");
                link_warning = Some(msg.format(
                    "production.batch_already_linked",
                    &[("batch", &batch_id.to_string())],
                ));
            }
        }

        Ok(ProductionSetup {
            work_order_id,
            references,
            link_warning,
        })
    }

    // ==========================================
    // Product catalog upload
    // ==========================================

    /// Insert-or-ignore every valid catalog row.
    #[instrument(skip(self, payload, options), fields(batch_ref))]
    pub async fn upload_products(&self, file_name: &str, payload: &str, options: &ParseOptions) -> ProductsUploadResult {
        let msg = &options.messages;
        let batch_ref = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_ref", batch_ref.as_str());
        info!(file_name, "product catalog upload started");

        let log_id = match self
            .ingestion_repo
            .insert_import_log(&batch_ref, file_name, UploadType::Products, None)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "import log could not be created");
                return ProductsUploadResult::failed(batch_ref, 0, vec![e.to_string()]);
            }
        };

        let parsed = match self.preview_products(payload, options).await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "product workbook rejected");
                let errors = self.close_failed(log_id, vec![e.to_string()]).await;
                return ProductsUploadResult::failed(batch_ref, 0, errors);
            }
        };

        if !parsed.errors.is_empty() {
            let errors = self.close_failed(log_id, parsed.errors).await;
            return ProductsUploadResult::failed(batch_ref, 0, errors);
        }

        let valid: Vec<_> = parsed
            .rows
            .iter()
            .filter_map(|r| r.to_entry().map(|entry| (r.row, entry)))
            .collect();
        if valid.is_empty() {
            let errors = self
                .close_failed(log_id, vec![msg.text("products.no_valid_rows")])
                .await;
            return ProductsUploadResult::failed(batch_ref, parsed.rows.len(), errors);
        }

        let mut inserted = 0usize;
        let mut skipped = 0usize;
        let mut errors = Vec::new();
        for (row, entry) in &valid {
            match self.catalog.insert_product_if_absent(entry).await {
                Ok(true) => inserted += 1,
                Ok(false) => skipped += 1,
                Err(e) => {
                    warn!(row_number = *row, item_id = %entry.item_id, error = %e, "product row not stored");
                    errors.push(msg.format(
                        "products.storage_failed",
                        &[
                            ("row", &row.to_string()),
                            ("item", &entry.item_id),
                            ("error", &e.to_string()),
                        ],
                    ));
                }
            }
        }

        let status = if errors.is_empty() {
            ImportStatus::Success
        } else if inserted > 0 {
            ImportStatus::Partial
        } else {
            ImportStatus::Error
        };
        self.close(log_id, status, inserted, &mut errors).await;
        info!(status = status.as_str(), inserted, skipped, "product catalog upload finished");

        ProductsUploadResult {
            success: errors.is_empty(),
            batch_ref,
            inserted,
            skipped,
            errors,
            status,
        }
    }

    // ==========================================
    // Import log helpers
    // ==========================================

    /// Finalize the log entry. A failure here is reported alongside the
    /// row results; the rows already written stay written.
    async fn close(&self, log_id: i64, status: ImportStatus, rows_imported: usize, errors: &mut Vec<String>) {
        let update = ImportLogUpdate {
            status,
            rows_imported,
            errors: errors.clone(),
        };
        if let Err(e) = self.ingestion_repo.finalize_import_log(log_id, &update).await {
            error!(log_id, error = %e, "import log could not be finalized");
            errors.push(e.to_string());
        }
    }

    /// Finalize as `error` with nothing imported.
    async fn close_failed(&self, log_id: i64, mut errors: Vec<String>) -> Vec<String> {
        self.close(log_id, ImportStatus::Error, 0, &mut errors).await;
        errors
    }
}
