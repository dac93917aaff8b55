// ==========================================
// Meat Production Analytics - API layer
// ==========================================
// Facade used by the CLI (and any other transport).
// ==========================================

pub mod alert_api;
pub mod error;
pub mod upload_api;

pub use alert_api::AlertApi;
pub use error::{ApiError, ApiResult};
pub use upload_api::UploadApi;
