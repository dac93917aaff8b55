// ==========================================
// Meat Production Analytics - application state
// ==========================================

use crate::api::{AlertApi, ApiResult, UploadApi};
use crate::db::{init_schema, open_sqlite_connection, read_schema_version};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Environment variable overriding the database location.
pub const DB_PATH_ENV: &str = "MEAT_ANALYTICS_DB_PATH";

/// API instances sharing a single SQLite connection.
pub struct AppState {
    pub db_path: String,
    pub upload_api: Arc<UploadApi>,
    pub alert_api: Arc<AlertApi>,
}

impl AppState {
    /// Open (creating if needed) the database and ensure the schema exists.
    pub fn new(db_path: String) -> ApiResult<Self> {
        tracing::info!(db_path = %db_path, "initialising application state");

        let conn = open_sqlite_connection(&db_path)?;
        init_schema(&conn)?;
        let version = read_schema_version(&conn)?;
        tracing::debug!(schema_version = ?version, "schema ready");

        let conn = Arc::new(Mutex::new(conn));
        Ok(Self {
            upload_api: Arc::new(UploadApi::from_connection(conn.clone())?),
            alert_api: Arc::new(AlertApi::from_connection(conn)?),
            db_path,
        })
    }

    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

/// Default database path.
///
/// 1. `MEAT_ANALYTICS_DB_PATH` when set and non-empty
/// 2. user data directory: meat-analytics/meat_analytics.db
/// 3. ./meat_analytics.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./meat_analytics.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("meat-analytics");
        // best-effort: on failure SQLite reports the open error later
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("meat_analytics.db");
        }
    }
    path.to_string_lossy().to_string()
}
