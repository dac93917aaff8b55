// ==========================================
// Meat Production Analytics - alerts and KPIs
// ==========================================

use crate::domain::types::{AlertCategory, AlertSeverity};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub severity: AlertSeverity,
    pub category: AlertCategory,
    pub title: String,
    pub message: String,
    pub factory_name: Option<String>,
    pub date: NaiveDate,
    pub value: Option<f64>,
    pub threshold: Option<f64>,
}

// ===== aggregate inputs read from storage =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryWasteTotals {
    pub factory_id: i64,
    pub factory_name: String,
    pub total_heads: i64,
    pub total_waste: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingProduction {
    pub factory_id: i64,
    pub factory_name: String,
    pub last_slaughter: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorySteakTotals {
    pub factory_id: i64,
    pub factory_name: String,
    pub x9_weight_kg: f64,
    pub steak_weight_kg: f64,
}

/// Production input/output per factory over a window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactoryYieldTotals {
    pub factory_id: i64,
    pub factory_name: String,
    pub halak_weight_in_kg: f64,
    pub kosher_weight_in_kg: f64,
    pub halak_output_kg: f64,
    pub muchshar_output_kg: f64,
    pub x9_weight_kg: f64,
    pub steak_weight_kg: f64,
}

/// Everything the alert engine needs for one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertInputs {
    pub waste: Vec<FactoryWasteTotals>,
    pub missing_production: Vec<MissingProduction>,
    pub steak: Vec<FactorySteakTotals>,
    pub recent_work_orders: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryKpi {
    pub factory_id: i64,
    pub factory_name: String,
    pub total_heads: i64,
    pub total_waste: i64,
    pub waste_pct: f64,
    pub input_kg: f64,
    pub output_kg: f64,
    pub yield_pct: f64,
    pub halak_yield_pct: f64,
    pub muchshar_yield_pct: f64,
    pub x9_weight_kg: f64,
    pub steak_weight_kg: f64,
    pub steak_pct: f64,
}

/// Alert windows and thresholds, all percentages in 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub waste_window_days: i64,
    pub waste_error_pct: f64,
    pub waste_warning_pct: f64,
    pub production_window_days: i64,
    pub steak_target_min_pct: f64,
    pub steak_target_max_pct: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            waste_window_days: 30,
            waste_error_pct: 15.0,
            waste_warning_pct: 12.0,
            production_window_days: 7,
            steak_target_min_pct: 10.0,
            steak_target_max_pct: 13.0,
        }
    }
}
