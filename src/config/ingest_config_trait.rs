// ==========================================
// Meat Production Analytics - ingestion config reader
// ==========================================
// Read-only; implemented by ConfigManager over config_kv.
// ==========================================

use crate::i18n::Messages;
use crate::importer::parse_options::ParseOptions;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

#[async_trait]
pub trait IngestConfigReader: Send + Sync {
    /// Locale of row errors and warnings.
    ///
    /// # Default
    /// - "en"
    async fn get_message_locale(&self) -> RepositoryResult<String>;

    /// Warn for every column that kept its positional default.
    ///
    /// # Default
    /// - false
    async fn get_strict_column_detection(&self) -> RepositoryResult<bool>;

    /// How many unlinked slaughter batches to offer for linking.
    ///
    /// # Default
    /// - 30
    async fn get_available_batches_limit(&self) -> RepositoryResult<usize>;

    /// Parse options for one upload.
    async fn load_parse_options(&self) -> RepositoryResult<ParseOptions> {
        let locale = self.get_message_locale().await?;
        let strict = self.get_strict_column_detection().await?;
        Ok(ParseOptions::new(Messages::new(&locale), strict))
    }
}
