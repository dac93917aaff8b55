// ==========================================
// Meat Production Analytics - engine layer
// ==========================================
// Pure rules over aggregates; no SQL here.
// ==========================================

pub mod alert_engine;
pub mod kpi;

pub use alert_engine::{percentage, AlertEngine, DateWindow};
pub use kpi::compute_factory_kpis;
