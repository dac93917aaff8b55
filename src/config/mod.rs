// ==========================================
// Meat Production Analytics - configuration
// ==========================================
// Storage: config_kv table, global scope
// ==========================================

pub mod alert_config_trait;
pub mod config_manager;
pub mod ingest_config_trait;

pub use alert_config_trait::AlertConfigReader;
pub use config_manager::{config_keys, ConfigManager};
pub use ingest_config_trait::IngestConfigReader;
