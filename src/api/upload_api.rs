// ==========================================
// Meat Production Analytics - upload API
// ==========================================
// Entry points of the web/CLI transport: base64 workbooks in, structured
// results out. Parse options are read from config per call.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, IngestConfigReader};
use crate::domain::catalog::ParsedProductData;
use crate::domain::import_log::ImportLogEntry;
use crate::domain::slaughter::{ParsedSlaughterData, SlaughterBatchOption};
use crate::importer::upload_service::{
    ProductionPreview, ProductionUploadRequest, ProductionUploadResult, ProductsUploadResult,
    SlaughterUploadResult, UploadService,
};
use crate::repository::{IngestionRepository, IngestionRepositoryImpl, ProductCatalogRepositoryImpl};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub struct UploadApi {
    ingestion_repo: Arc<IngestionRepositoryImpl>,
    config: Arc<ConfigManager>,
    service: UploadService<IngestionRepositoryImpl, ProductCatalogRepositoryImpl>,
}

impl UploadApi {
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// All repositories share the given connection.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        let ingestion_repo = Arc::new(IngestionRepositoryImpl::from_connection(conn.clone()));
        let catalog = Arc::new(ProductCatalogRepositoryImpl::from_connection(conn.clone()));
        let config = Arc::new(ConfigManager::from_connection(conn)?);
        Ok(Self {
            service: UploadService::new(ingestion_repo.clone(), catalog),
            ingestion_repo,
            config,
        })
    }

    // ===== slaughter =====

    pub async fn preview_slaughter(&self, payload: &str) -> ApiResult<ParsedSlaughterData> {
        let options = self.config.load_parse_options().await?;
        Ok(self.service.preview_slaughter(payload, &options)?)
    }

    pub async fn upload_slaughter(
        &self,
        factory_id: i64,
        file_name: &str,
        payload: &str,
    ) -> ApiResult<SlaughterUploadResult> {
        validate_factory_id(factory_id)?;
        let options = self.config.load_parse_options().await?;
        Ok(self
            .service
            .upload_slaughter(factory_id, file_name, payload, &options)
            .await)
    }

    // ===== production =====

    pub async fn preview_production(&self, payload: &str) -> ApiResult<ProductionPreview> {
        let options = self.config.load_parse_options().await?;
        Ok(self.service.preview_production(payload, &options).await?)
    }

    pub async fn upload_production(&self, request: &ProductionUploadRequest) -> ApiResult<ProductionUploadResult> {
        validate_factory_id(request.factory_id)?;
        if let Some(batch_id) = request.slaughter_batch_id {
            if batch_id <= 0 {
                return Err(ApiError::InvalidInput(format!(
                    "slaughter_batch_id must be positive, got {}",
                    batch_id
                )));
            }
        }
        let options = self.config.load_parse_options().await?;
        Ok(self.service.upload_production(request, &options).await)
    }

    /// Unlinked slaughter batches of the factory, newest first.
    pub async fn list_available_slaughter_batches(&self, factory_id: i64) -> ApiResult<Vec<SlaughterBatchOption>> {
        validate_factory_id(factory_id)?;
        let limit = self.config.get_available_batches_limit().await?;
        Ok(self
            .ingestion_repo
            .list_unlinked_slaughter_batches(factory_id, limit)
            .await?)
    }

    // ===== product catalog =====

    pub async fn preview_products(&self, payload: &str) -> ApiResult<ParsedProductData> {
        let options = self.config.load_parse_options().await?;
        Ok(self.service.preview_products(payload, &options).await?)
    }

    pub async fn upload_products(&self, file_name: &str, payload: &str) -> ApiResult<ProductsUploadResult> {
        let options = self.config.load_parse_options().await?;
        Ok(self.service.upload_products(file_name, payload, &options).await)
    }

    // ===== history =====

    pub async fn list_import_history(&self, limit: usize) -> ApiResult<Vec<ImportLogEntry>> {
        if limit == 0 {
            return Err(ApiError::InvalidInput("limit must be at least 1".to_string()));
        }
        Ok(self.ingestion_repo.list_import_logs(limit).await?)
    }
}

fn validate_factory_id(factory_id: i64) -> ApiResult<()> {
    if factory_id <= 0 {
        return Err(ApiError::InvalidInput(format!(
            "factory_id must be positive, got {}",
            factory_id
        )));
    }
    Ok(())
}
