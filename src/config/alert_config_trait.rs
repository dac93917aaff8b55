// ==========================================
// Meat Production Analytics - alert config reader
// ==========================================

use crate::domain::alert::AlertThresholds;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

#[async_trait]
pub trait AlertConfigReader: Send + Sync {
    /// Rolling window of the waste check. Default 30.
    async fn get_waste_window_days(&self) -> RepositoryResult<i64>;

    /// Waste % strictly above this is an error. Default 15.
    async fn get_waste_error_pct(&self) -> RepositoryResult<f64>;

    /// Waste % strictly above this is a warning. Default 12.
    async fn get_waste_warning_pct(&self) -> RepositoryResult<f64>;

    /// Window of the steak-yield and missing-production checks. Default 7.
    async fn get_production_window_days(&self) -> RepositoryResult<i64>;

    /// Inclusive steak-yield target range. Default (10, 13).
    async fn get_steak_target_range(&self) -> RepositoryResult<(f64, f64)>;

    async fn load_alert_thresholds(&self) -> RepositoryResult<AlertThresholds> {
        let (steak_target_min_pct, steak_target_max_pct) = self.get_steak_target_range().await?;
        Ok(AlertThresholds {
            waste_window_days: self.get_waste_window_days().await?,
            waste_error_pct: self.get_waste_error_pct().await?,
            waste_warning_pct: self.get_waste_warning_pct().await?,
            production_window_days: self.get_production_window_days().await?,
            steak_target_min_pct,
            steak_target_max_pct,
        })
    }
}
