// ==========================================
// Meat Production Analytics - analytics repository
// ==========================================
// Read-only aggregate queries behind alerts and KPIs. Windows are
// inclusive date ranges [from, to]; classification happens in the engine.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::alert::{
    FactorySteakTotals, FactoryWasteTotals, FactoryYieldTotals, MissingProduction,
};
use crate::domain::types::KosherFamily;
use crate::importer::coercion::{normalize_kosher_family, Categorical};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Heads and waste per factory; factories with zero heads are omitted.
    async fn waste_totals(&self, from: NaiveDate, to: NaiveDate) -> RepositoryResult<Vec<FactoryWasteTotals>>;

    /// Factories that slaughtered in the window but have no work order in it.
    async fn missing_production(&self, from: NaiveDate, to: NaiveDate) -> RepositoryResult<Vec<MissingProduction>>;

    /// X9 and steak output weight per factory; factories without X9 output are omitted.
    async fn steak_totals(&self, from: NaiveDate, to: NaiveDate) -> RepositoryResult<Vec<FactorySteakTotals>>;

    async fn count_work_orders(&self, from: NaiveDate, to: NaiveDate) -> RepositoryResult<i64>;

    /// Input and output weights per factory, output split by kosher family.
    async fn yield_totals(&self, from: NaiveDate, to: NaiveDate) -> RepositoryResult<Vec<FactoryYieldTotals>>;
}

pub struct AnalyticsRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl AnalyticsRepositoryImpl {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

#[async_trait]
impl AnalyticsRepository for AnalyticsRepositoryImpl {
    async fn waste_totals(&self, from: NaiveDate, to: NaiveDate) -> RepositoryResult<Vec<FactoryWasteTotals>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT f.id,
                   COALESCE(f.name_hebrew, f.name) AS factory_name,
                   COALESCE(SUM(sb.cows_count + sb.bulls_count), 0) AS total_heads,
                   COALESCE(SUM(sb.waste_lungs + sb.waste_inner + sb.waste_outer), 0) AS total_waste
            FROM slaughter_batches sb
            JOIN factories f ON sb.factory_id = f.id
            WHERE sb.date >= ?1 AND sb.date <= ?2
            GROUP BY f.id, f.name, f.name_hebrew
            HAVING COALESCE(SUM(sb.cows_count + sb.bulls_count), 0) > 0
            ORDER BY f.id
            "#,
        )?;
        let rows = stmt
            .query_map(params![from, to], |r| {
                Ok(FactoryWasteTotals {
                    factory_id: r.get(0)?,
                    factory_name: r.get(1)?,
                    total_heads: r.get(2)?,
                    total_waste: r.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn missing_production(&self, from: NaiveDate, to: NaiveDate) -> RepositoryResult<Vec<MissingProduction>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT f.id, COALESCE(f.name_hebrew, f.name) AS factory_name, MAX(sb.date) AS last_slaughter
            FROM slaughter_batches sb
            JOIN factories f ON sb.factory_id = f.id
            WHERE sb.date >= ?1 AND sb.date <= ?2
              AND f.id NOT IN (
                  SELECT DISTINCT wo.factory_id
                  FROM work_orders wo
                  WHERE wo.production_date >= ?1 AND wo.production_date <= ?2
              )
            GROUP BY f.id, f.name, f.name_hebrew
            ORDER BY f.id
            "#,
        )?;
        let rows = stmt
            .query_map(params![from, to], |r| {
                Ok(MissingProduction {
                    factory_id: r.get(0)?,
                    factory_name: r.get(1)?,
                    last_slaughter: r.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn steak_totals(&self, from: NaiveDate, to: NaiveDate) -> RepositoryResult<Vec<FactorySteakTotals>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT f.id,
                   COALESCE(f.name_hebrew, f.name) AS factory_name,
                   COALESCE(SUM(CASE WHEN p.is_anatomical = 1 THEN pr.weight_kg ELSE 0 END), 0) AS x9_weight,
                   COALESCE(SUM(CASE WHEN p.is_steak = 1 THEN pr.weight_kg ELSE 0 END), 0) AS steak_weight
            FROM production_records pr
            JOIN products p ON pr.item_id = p.item_id
            JOIN work_orders wo ON pr.work_order_id = wo.id
            JOIN factories f ON wo.factory_id = f.id
            WHERE wo.production_date >= ?1 AND wo.production_date <= ?2
            GROUP BY f.id, f.name, f.name_hebrew
            HAVING COALESCE(SUM(CASE WHEN p.is_anatomical = 1 THEN pr.weight_kg ELSE 0 END), 0) > 0
            ORDER BY f.id
            "#,
        )?;
        let rows = stmt
            .query_map(params![from, to], |r| {
                Ok(FactorySteakTotals {
                    factory_id: r.get(0)?,
                    factory_name: r.get(1)?,
                    x9_weight_kg: r.get(2)?,
                    steak_weight_kg: r.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn count_work_orders(&self, from: NaiveDate, to: NaiveDate) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row(
            "SELECT COUNT(*) FROM work_orders WHERE production_date >= ?1 AND production_date <= ?2",
            params![from, to],
            |r| r.get(0),
        )?;
        Ok(n)
    }

    async fn yield_totals(&self, from: NaiveDate, to: NaiveDate) -> RepositoryResult<Vec<FactoryYieldTotals>> {
        let conn = self.get_conn()?;
        let mut totals: BTreeMap<i64, FactoryYieldTotals> = BTreeMap::new();

        // ===== input side =====
        let mut stmt = conn.prepare(
            r#"
            SELECT f.id, COALESCE(f.name_hebrew, f.name),
                   COALESCE(SUM(wo.halak_weight_in_kg), 0),
                   COALESCE(SUM(wo.kosher_weight_in_kg), 0)
            FROM work_orders wo
            JOIN factories f ON wo.factory_id = f.id
            WHERE wo.production_date >= ?1 AND wo.production_date <= ?2
            GROUP BY f.id, f.name, f.name_hebrew
            "#,
        )?;
        let inputs = stmt
            .query_map(params![from, to], |r| {
                Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?, r.get::<_, f64>(2)?, r.get::<_, f64>(3)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for (factory_id, factory_name, halak_in, kosher_in) in inputs {
            totals.insert(
                factory_id,
                FactoryYieldTotals {
                    factory_id,
                    factory_name,
                    halak_weight_in_kg: halak_in,
                    kosher_weight_in_kg: kosher_in,
                    ..Default::default()
                },
            );
        }

        // ===== output side, per kosher family label =====
        let mut stmt = conn.prepare(
            r#"
            SELECT wo.factory_id, COALESCE(kf.family, ''),
                   COALESCE(SUM(pr.weight_kg), 0),
                   COALESCE(SUM(CASE WHEN p.is_anatomical = 1 THEN pr.weight_kg ELSE 0 END), 0),
                   COALESCE(SUM(CASE WHEN p.is_steak = 1 THEN pr.weight_kg ELSE 0 END), 0)
            FROM production_records pr
            JOIN work_orders wo ON pr.work_order_id = wo.id
            JOIN products p ON pr.item_id = p.item_id
            LEFT JOIN kosher_families kf ON p.kosher_id = kf.id
            WHERE wo.production_date >= ?1 AND wo.production_date <= ?2
            GROUP BY wo.factory_id, kf.family
            "#,
        )?;
        let outputs = stmt
            .query_map(params![from, to], |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, f64>(2)?,
                    r.get::<_, f64>(3)?,
                    r.get::<_, f64>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for (factory_id, family, weight, x9, steak) in outputs {
            // output rows always belong to a work order counted above
            if let Some(t) = totals.get_mut(&factory_id) {
                match normalize_kosher_family(&family) {
                    Categorical::Known(KosherFamily::Halak) => t.halak_output_kg += weight,
                    _ => t.muchshar_output_kg += weight,
                }
                t.x9_weight_kg += x9;
                t.steak_weight_kg += steak;
            }
        }

        Ok(totals.into_values().collect())
    }
}
