// ==========================================
// Meat Production Analytics - alert engine
// ==========================================
// Pure rules over aggregates read by the analytics repository.
// Order of output: waste, missing production, steak yield, system.
// ==========================================

use crate::domain::alert::{Alert, AlertInputs, AlertThresholds};
use crate::domain::types::{AlertCategory, AlertSeverity};
use crate::i18n::Messages;
use chrono::{Duration, NaiveDate};

/// Inclusive date window ending at `as_of`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    pub fn ending_at(as_of: NaiveDate, days: i64) -> Self {
        Self {
            from: as_of - Duration::days(days.max(0)),
            to: as_of,
        }
    }
}

/// Percentage of `part` in `whole`, 0 when `whole` is 0.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

fn one_decimal(v: f64) -> String {
    format!("{:.1}", v)
}

fn trim_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

// ==========================================
// AlertEngine
// ==========================================
pub struct AlertEngine {
    thresholds: AlertThresholds,
}

impl AlertEngine {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    pub fn waste_window(&self, as_of: NaiveDate) -> DateWindow {
        DateWindow::ending_at(as_of, self.thresholds.waste_window_days)
    }

    pub fn production_window(&self, as_of: NaiveDate) -> DateWindow {
        DateWindow::ending_at(as_of, self.thresholds.production_window_days)
    }

    pub fn evaluate(&self, inputs: &AlertInputs, as_of: NaiveDate, messages: &Messages) -> Vec<Alert> {
        let mut alerts = Vec::new();
        self.waste_alerts(inputs, as_of, messages, &mut alerts);
        self.missing_production_alerts(inputs, as_of, messages, &mut alerts);
        self.steak_alerts(inputs, as_of, messages, &mut alerts);
        self.system_alerts(inputs, as_of, messages, &mut alerts);
        alerts
    }

    fn waste_alerts(&self, inputs: &AlertInputs, as_of: NaiveDate, msg: &Messages, out: &mut Vec<Alert>) {
        let t = &self.thresholds;
        let threshold = trim_number(t.waste_error_pct);
        for row in inputs.waste.iter().filter(|r| r.total_heads > 0) {
            let pct = percentage(row.total_waste as f64, row.total_heads as f64);
            let args = [("pct", one_decimal(pct)), ("threshold", threshold.clone())];
            let args: Vec<(&str, &str)> = args.iter().map(|(k, v)| (*k, v.as_str())).collect();

            let (id, severity, title_key, message_key) = if pct > t.waste_error_pct {
                (
                    format!("waste-error-{}", row.factory_id),
                    AlertSeverity::Error,
                    "alerts.waste_error_title",
                    "alerts.waste_error_message",
                )
            } else if pct > t.waste_warning_pct {
                (
                    format!("waste-warn-{}", row.factory_id),
                    AlertSeverity::Warning,
                    "alerts.waste_warning_title",
                    "alerts.waste_warning_message",
                )
            } else {
                continue;
            };

            out.push(Alert {
                id,
                severity,
                category: AlertCategory::Waste,
                title: msg.text(title_key),
                message: msg.format(message_key, &args),
                factory_name: Some(row.factory_name.clone()),
                date: as_of,
                value: Some(pct),
                threshold: Some(t.waste_error_pct),
            });
        }
    }

    fn missing_production_alerts(&self, inputs: &AlertInputs, as_of: NaiveDate, msg: &Messages, out: &mut Vec<Alert>) {
        let days = self.thresholds.production_window_days.to_string();
        for row in &inputs.missing_production {
            out.push(Alert {
                id: format!("no-prod-{}", row.factory_id),
                severity: AlertSeverity::Warning,
                category: AlertCategory::Production,
                title: msg.text("alerts.missing_production_title"),
                message: msg.format(
                    "alerts.missing_production_message",
                    &[("days", &days), ("date", &row.last_slaughter.to_string())],
                ),
                factory_name: Some(row.factory_name.clone()),
                date: as_of,
                value: None,
                threshold: None,
            });
        }
    }

    fn steak_alerts(&self, inputs: &AlertInputs, as_of: NaiveDate, msg: &Messages, out: &mut Vec<Alert>) {
        let t = &self.thresholds;
        let (min, max) = (trim_number(t.steak_target_min_pct), trim_number(t.steak_target_max_pct));
        for row in inputs.steak.iter().filter(|r| r.x9_weight_kg > 0.0) {
            let pct = percentage(row.steak_weight_kg, row.x9_weight_kg);
            if pct <= 0.0 {
                continue;
            }
            let title_key = if pct < t.steak_target_min_pct {
                "alerts.steak_low_title"
            } else if pct > t.steak_target_max_pct {
                "alerts.steak_high_title"
            } else {
                continue;
            };
            out.push(Alert {
                id: format!("steak-{}", row.factory_id),
                severity: AlertSeverity::Warning,
                category: AlertCategory::Production,
                title: msg.text(title_key),
                message: msg.format(
                    "alerts.steak_message",
                    &[("pct", &one_decimal(pct)), ("min", &min), ("max", &max)],
                ),
                factory_name: Some(row.factory_name.clone()),
                date: as_of,
                value: Some(pct),
                threshold: None,
            });
        }
    }

    fn system_alerts(&self, inputs: &AlertInputs, as_of: NaiveDate, msg: &Messages, out: &mut Vec<Alert>) {
        if inputs.recent_work_orders > 0 {
            return;
        }
        out.push(Alert {
            id: "no-recent-production".to_string(),
            severity: AlertSeverity::Info,
            category: AlertCategory::System,
            title: msg.text("alerts.no_recent_production_title"),
            message: msg.format(
                "alerts.no_recent_production_message",
                &[("days", &self.thresholds.production_window_days.to_string())],
            ),
            factory_name: None,
            date: as_of,
            value: None,
            threshold: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alert::{FactorySteakTotals, FactoryWasteTotals, MissingProduction};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn waste(id: i64, heads: i64, waste: i64) -> FactoryWasteTotals {
        FactoryWasteTotals {
            factory_id: id,
            factory_name: format!("F{}", id),
            total_heads: heads,
            total_waste: waste,
        }
    }

    fn steak(id: i64, x9: f64, steak: f64) -> FactorySteakTotals {
        FactorySteakTotals {
            factory_id: id,
            factory_name: format!("F{}", id),
            x9_weight_kg: x9,
            steak_weight_kg: steak,
        }
    }

    #[test]
    fn test_window_is_inclusive_of_both_ends() {
        let w = DateWindow::ending_at(d("2024-01-31"), 30);
        assert_eq!(w.from, d("2024-01-01"));
        assert_eq!(w.to, d("2024-01-31"));
    }

    #[test]
    fn test_waste_thresholds_are_strict() {
        let engine = AlertEngine::new(AlertThresholds::default());
        let inputs = AlertInputs {
            waste: vec![waste(1, 100, 16), waste(2, 100, 13), waste(3, 100, 12), waste(4, 100, 15)],
            recent_work_orders: 1,
            ..Default::default()
        };
        let alerts = engine.evaluate(&inputs, d("2024-01-15"), &Messages::default());
        let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["waste-error-1", "waste-warn-2", "waste-warn-4"]);
        assert_eq!(alerts[0].severity, AlertSeverity::Error);
        assert_eq!(alerts[0].threshold, Some(15.0));
        assert!(alerts[0].message.contains("16.0"));
        assert!(alerts[1].message.contains("15"));
    }

    #[test]
    fn test_steak_range_and_titles() {
        let engine = AlertEngine::new(AlertThresholds::default());
        let inputs = AlertInputs {
            steak: vec![steak(1, 100.0, 5.0), steak(2, 100.0, 11.0), steak(3, 100.0, 20.0), steak(4, 100.0, 0.0)],
            recent_work_orders: 3,
            ..Default::default()
        };
        let alerts = engine.evaluate(&inputs, d("2024-01-15"), &Messages::default());
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].id, "steak-1");
        assert_eq!(alerts[0].title, "Steak yield too low");
        assert_eq!(alerts[1].id, "steak-3");
        assert_eq!(alerts[1].title, "Steak yield too high");
        assert_eq!(alerts[1].value, Some(20.0));
    }

    #[test]
    fn test_order_and_system_alert() {
        let engine = AlertEngine::new(AlertThresholds::default());
        let inputs = AlertInputs {
            waste: vec![waste(1, 10, 5)],
            missing_production: vec![MissingProduction {
                factory_id: 2,
                factory_name: "F2".to_string(),
                last_slaughter: d("2024-01-12"),
            }],
            steak: Vec::new(),
            recent_work_orders: 0,
        };
        let alerts = engine.evaluate(&inputs, d("2024-01-15"), &Messages::default());
        let categories: Vec<AlertCategory> = alerts.iter().map(|a| a.category).collect();
        assert_eq!(
            categories,
            vec![AlertCategory::Waste, AlertCategory::Production, AlertCategory::System]
        );
        assert!(alerts[1].message.contains("2024-01-12"));
        assert_eq!(alerts[2].id, "no-recent-production");
        assert_eq!(alerts[2].severity, AlertSeverity::Info);
        assert!(alerts[2].factory_name.is_none());
    }

    #[test]
    fn test_percentage_zero_denominator() {
        assert_eq!(percentage(5.0, 0.0), 0.0);
        assert_eq!(percentage(1.0, 4.0), 25.0);
    }
}
