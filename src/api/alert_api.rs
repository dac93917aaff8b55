// ==========================================
// Meat Production Analytics - alert and KPI API
// ==========================================

use crate::api::error::ApiResult;
use crate::config::{AlertConfigReader, ConfigManager, IngestConfigReader};
use crate::domain::alert::{Alert, AlertInputs, FactoryKpi};
use crate::engine::{compute_factory_kpis, AlertEngine};
use crate::i18n::Messages;
use crate::repository::{AnalyticsRepository, AnalyticsRepositoryImpl};
use chrono::NaiveDate;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

pub struct AlertApi {
    analytics: Arc<AnalyticsRepositoryImpl>,
    config: Arc<ConfigManager>,
}

impl AlertApi {
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        Ok(Self {
            analytics: Arc::new(AnalyticsRepositoryImpl::from_connection(conn.clone())),
            config: Arc::new(ConfigManager::from_connection(conn)?),
        })
    }

    /// Alerts as of the given day, windows inclusive of both ends.
    #[instrument(skip(self))]
    pub async fn alerts(&self, as_of: NaiveDate) -> ApiResult<Vec<Alert>> {
        let thresholds = self.config.load_alert_thresholds().await?;
        let messages = Messages::new(&self.config.get_message_locale().await?);
        let engine = AlertEngine::new(thresholds);

        let waste_window = engine.waste_window(as_of);
        let prod_window = engine.production_window(as_of);
        let inputs = AlertInputs {
            waste: self.analytics.waste_totals(waste_window.from, waste_window.to).await?,
            missing_production: self
                .analytics
                .missing_production(prod_window.from, prod_window.to)
                .await?,
            steak: self.analytics.steak_totals(prod_window.from, prod_window.to).await?,
            recent_work_orders: self
                .analytics
                .count_work_orders(prod_window.from, prod_window.to)
                .await?,
        };

        let alerts = engine.evaluate(&inputs, as_of, &messages);
        debug!(count = alerts.len(), "alerts evaluated");
        Ok(alerts)
    }

    /// Per-factory KPIs: waste over the waste window, yields over the
    /// production window.
    pub async fn factory_kpis(&self, as_of: NaiveDate) -> ApiResult<Vec<FactoryKpi>> {
        let engine = AlertEngine::new(self.config.load_alert_thresholds().await?);
        let waste_window = engine.waste_window(as_of);
        let prod_window = engine.production_window(as_of);

        let waste = self.analytics.waste_totals(waste_window.from, waste_window.to).await?;
        let yields = self.analytics.yield_totals(prod_window.from, prod_window.to).await?;
        Ok(compute_factory_kpis(&waste, &yields))
    }
}
