// ==========================================
// Meat Production Analytics - factory KPIs
// ==========================================

use crate::domain::alert::{FactoryKpi, FactoryWasteTotals, FactoryYieldTotals};
use crate::engine::alert_engine::percentage;
use std::collections::BTreeMap;

/// Merge slaughter and production aggregates into one KPI row per factory.
///
/// A factory present in only one of the inputs gets zeros for the other side.
/// Yields are output over input weight; the halak and muchshar yields use
/// the input of the same kosher family.
pub fn compute_factory_kpis(waste: &[FactoryWasteTotals], yields: &[FactoryYieldTotals]) -> Vec<FactoryKpi> {
    let mut kpis: BTreeMap<i64, FactoryKpi> = BTreeMap::new();

    for w in waste {
        let kpi = kpis
            .entry(w.factory_id)
            .or_insert_with(|| empty_kpi(w.factory_id, &w.factory_name));
        kpi.total_heads = w.total_heads;
        kpi.total_waste = w.total_waste;
        kpi.waste_pct = percentage(w.total_waste as f64, w.total_heads as f64);
    }

    for y in yields {
        let kpi = kpis
            .entry(y.factory_id)
            .or_insert_with(|| empty_kpi(y.factory_id, &y.factory_name));
        let input = y.halak_weight_in_kg + y.kosher_weight_in_kg;
        let output = y.halak_output_kg + y.muchshar_output_kg;
        kpi.input_kg = input;
        kpi.output_kg = output;
        kpi.yield_pct = percentage(output, input);
        kpi.halak_yield_pct = percentage(y.halak_output_kg, y.halak_weight_in_kg);
        kpi.muchshar_yield_pct = percentage(y.muchshar_output_kg, y.kosher_weight_in_kg);
        kpi.x9_weight_kg = y.x9_weight_kg;
        kpi.steak_weight_kg = y.steak_weight_kg;
        kpi.steak_pct = percentage(y.steak_weight_kg, y.x9_weight_kg);
    }

    kpis.into_values().collect()
}

fn empty_kpi(factory_id: i64, factory_name: &str) -> FactoryKpi {
    FactoryKpi {
        factory_id,
        factory_name: factory_name.to_string(),
        total_heads: 0,
        total_waste: 0,
        waste_pct: 0.0,
        input_kg: 0.0,
        output_kg: 0.0,
        yield_pct: 0.0,
        halak_yield_pct: 0.0,
        muchshar_yield_pct: 0.0,
        x9_weight_kg: 0.0,
        steak_weight_kg: 0.0,
        steak_pct: 0.0,
    }
}
