// ==========================================
// Meat Production Analytics - config manager
// ==========================================
// Storage: config_kv (scope_id = 'global'). Missing or malformed values
// fall back to the defaults below.
// ==========================================

use crate::config::alert_config_trait::AlertConfigReader;
use crate::config::ingest_config_trait::IngestConfigReader;
use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::i18n::resolve_locale;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Re-applies the connection PRAGMAs (idempotent).
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// All global values, ordered by key.
    pub fn get_config_snapshot(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        let mut map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            map.insert(key, value);
        }
        Ok(map)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    fn get_f64(&self, key: &str, default: f64) -> RepositoryResult<f64> {
        let value = self.get_config_or_default(key, &default.to_string())?;
        Ok(value.trim().parse::<f64>().unwrap_or(default))
    }

    fn get_i64(&self, key: &str, default: i64) -> RepositoryResult<i64> {
        let value = self.get_config_or_default(key, &default.to_string())?;
        Ok(value.trim().parse::<i64>().unwrap_or(default))
    }
}

#[async_trait]
impl IngestConfigReader for ConfigManager {
    async fn get_message_locale(&self) -> RepositoryResult<String> {
        let value = self.get_config_or_default(config_keys::MESSAGE_LOCALE, "en")?;
        Ok(resolve_locale(&value).to_string())
    }

    async fn get_strict_column_detection(&self) -> RepositoryResult<bool> {
        let value = self.get_config_or_default(config_keys::STRICT_COLUMN_DETECTION, "false")?;
        Ok(matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
    }

    async fn get_available_batches_limit(&self) -> RepositoryResult<usize> {
        let value = self.get_config_or_default(config_keys::AVAILABLE_BATCHES_LIMIT, "30")?;
        Ok(value.trim().parse::<usize>().unwrap_or(30))
    }
}

#[async_trait]
impl AlertConfigReader for ConfigManager {
    async fn get_waste_window_days(&self) -> RepositoryResult<i64> {
        self.get_i64(config_keys::WASTE_WINDOW_DAYS, 30)
    }

    async fn get_waste_error_pct(&self) -> RepositoryResult<f64> {
        self.get_f64(config_keys::WASTE_ERROR_PCT, 15.0)
    }

    async fn get_waste_warning_pct(&self) -> RepositoryResult<f64> {
        self.get_f64(config_keys::WASTE_WARNING_PCT, 12.0)
    }

    async fn get_production_window_days(&self) -> RepositoryResult<i64> {
        self.get_i64(config_keys::PRODUCTION_WINDOW_DAYS, 7)
    }

    async fn get_steak_target_range(&self) -> RepositoryResult<(f64, f64)> {
        let min = self.get_f64(config_keys::STEAK_TARGET_MIN_PCT, 10.0)?;
        let max = self.get_f64(config_keys::STEAK_TARGET_MAX_PCT, 13.0)?;
        Ok((min, max))
    }
}

// ==========================================
// config keys
// ==========================================
pub mod config_keys {
    // ===== ingestion =====
    pub const MESSAGE_LOCALE: &str = "message_locale";
    pub const STRICT_COLUMN_DETECTION: &str = "strict_column_detection";
    pub const AVAILABLE_BATCHES_LIMIT: &str = "available_batches_limit";

    // ===== alerts =====
    pub const WASTE_WINDOW_DAYS: &str = "waste_window_days";
    pub const WASTE_ERROR_PCT: &str = "waste_error_pct";
    pub const WASTE_WARNING_PCT: &str = "waste_warning_pct";
    pub const PRODUCTION_WINDOW_DAYS: &str = "production_window_days";
    pub const STEAK_TARGET_MIN_PCT: &str = "steak_target_min_pct";
    pub const STEAK_TARGET_MAX_PCT: &str = "steak_target_max_pct";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::domain::alert::AlertThresholds;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_unset() {
        let cfg = manager();
        assert_eq!(cfg.get_message_locale().await.unwrap(), "en");
        assert!(!cfg.get_strict_column_detection().await.unwrap());
        assert_eq!(cfg.get_available_batches_limit().await.unwrap(), 30);
        assert_eq!(cfg.load_alert_thresholds().await.unwrap(), AlertThresholds::default());
    }

    #[tokio::test]
    async fn test_overrides_and_malformed_values() {
        let cfg = manager();
        cfg.set_global_config_value(config_keys::MESSAGE_LOCALE, "he").unwrap();
        cfg.set_global_config_value(config_keys::STRICT_COLUMN_DETECTION, "TRUE").unwrap();
        cfg.set_global_config_value(config_keys::WASTE_ERROR_PCT, "18.5").unwrap();
        cfg.set_global_config_value(config_keys::WASTE_WINDOW_DAYS, "a month").unwrap();

        assert_eq!(cfg.get_message_locale().await.unwrap(), "he");
        assert!(cfg.get_strict_column_detection().await.unwrap());
        let t = cfg.load_alert_thresholds().await.unwrap();
        assert_eq!(t.waste_error_pct, 18.5);
        assert_eq!(t.waste_window_days, 30);

        let snapshot = cfg.get_config_snapshot().unwrap();
        assert_eq!(snapshot.get("waste_error_pct").map(String::as_str), Some("18.5"));
    }

    #[tokio::test]
    async fn test_unsupported_locale_falls_back() {
        let cfg = manager();
        cfg.set_global_config_value(config_keys::MESSAGE_LOCALE, "fr").unwrap();
        assert_eq!(cfg.get_message_locale().await.unwrap(), "en");
    }
}
