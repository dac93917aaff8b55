// ==========================================
// Meat Production Analytics - repository layer
// ==========================================
// No business rules here; every query is parameterized.
// ==========================================

pub mod analytics_repo;
pub mod catalog_repo;
pub mod catalog_repo_impl;
pub mod error;
pub mod ingestion_repo;
pub mod ingestion_repo_impl;

pub use analytics_repo::{AnalyticsRepository, AnalyticsRepositoryImpl};
pub use catalog_repo::ProductCatalog;
pub use catalog_repo_impl::ProductCatalogRepositoryImpl;
pub use error::{RepositoryError, RepositoryResult};
pub use ingestion_repo::IngestionRepository;
pub use ingestion_repo_impl::IngestionRepositoryImpl;
