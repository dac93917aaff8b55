// ==========================================
// Alerts and KPIs over uploaded data
// ==========================================


use chrono::NaiveDate;
use meat_analytics::api::{AlertApi, UploadApi};
use meat_analytics::config::config_keys;
use meat_analytics::domain::types::{AlertCategory, AlertSeverity};
use meat_analytics::importer::ProductionUploadRequest;
use meat_analytics::logging;
use test_helpers::*;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// North: 20% waste, steak at 8% of X9.
/// South: 13% waste, slaughter without production.
async fn seed(db_path: &str) {
    let upload = UploadApi::new(db_path).unwrap();

    let north = slaughter_payload(vec![slaughter_row("2024-01-15", [100, 0, 60, 30, 10, 10, 5, 5])]);
    let r = upload.upload_slaughter(NORTH, "north.csv", &north).await.unwrap();
    assert!(r.success);

    let south = slaughter_payload(vec![slaughter_row("2024-01-18", [100, 0, 60, 30, 10, 8, 3, 2])]);
    let r = upload.upload_slaughter(SOUTH, "south.csv", &south).await.unwrap();
    assert!(r.success);

    let production = production_payload(
        Some("2024-01-16"),
        [4.0, 2.0, 200.0, 100.0],
        &[
            (X9_ITEM, 1.0, 1.0, 100.0),
            (STEAK_ITEM, 1.0, 1.0, 8.0),
            (MUCHSHAR_ITEM, 1.0, 1.0, 50.0),
        ],
    );
    let request = ProductionUploadRequest {
        factory_id: NORTH,
        file_name: "north-production.csv".to_string(),
        payload: production,
        production_date: None,
        slaughter_batch_id: None,
    };
    let r = upload.upload_production(&request).await.unwrap();
    assert_eq!(r.rows_inserted, 3);
}

#[tokio::test]
async fn test_alerts_in_rule_order() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    seed(&db_path).await;

    let alerts = AlertApi::new(&db_path).unwrap().alerts(d("2024-01-20")).await.unwrap();
    let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["waste-error-1", "waste-warn-2", "no-prod-2", "steak-1"]);

    let waste_error = &alerts[0];
    assert_eq!(waste_error.severity, AlertSeverity::Error);
    assert_eq!(waste_error.category, AlertCategory::Waste);
    assert_eq!(waste_error.factory_name.as_deref(), Some("North"));
    assert_eq!(
        waste_error.message,
        "Waste is at 20.0%, above the allowed threshold of 15%"
    );

    let waste_warning = &alerts[1];
    assert_eq!(waste_warning.severity, AlertSeverity::Warning);
    assert_eq!(waste_warning.factory_name.as_deref(), Some("דרום"));
    assert!(waste_warning.message.contains("13.0%"));

    assert!(alerts[2].message.contains("2024-01-18"));

    let steak = &alerts[3];
    assert_eq!(steak.title, "Steak yield too low");
    assert_eq!(steak.message, "Steak share of X9 is 8.0%, target is 10%-13%");
}

#[tokio::test]
async fn test_windows_exclude_old_data() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    seed(&db_path).await;

    // waste window 2024-01-16..2024-02-15 keeps only the South batch
    let alerts = AlertApi::new(&db_path).unwrap().alerts(d("2024-02-15")).await.unwrap();
    let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["waste-warn-2", "no-recent-production"]);
    assert_eq!(alerts[1].severity, AlertSeverity::Info);
    assert!(alerts[1].factory_name.is_none());
}

#[tokio::test]
async fn test_empty_database_reports_no_recent_production() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();

    let alerts = AlertApi::new(&db_path).unwrap().alerts(d("2024-01-20")).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].id, "no-recent-production");
    assert_eq!(alerts[0].category, AlertCategory::System);
}

#[tokio::test]
async fn test_thresholds_come_from_config() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    seed(&db_path).await;
    set_config(&db_path, config_keys::WASTE_ERROR_PCT, "25");
    set_config(&db_path, config_keys::WASTE_WARNING_PCT, "14");
    set_config(&db_path, config_keys::STEAK_TARGET_MIN_PCT, "5");

    let alerts = AlertApi::new(&db_path).unwrap().alerts(d("2024-01-20")).await.unwrap();
    let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["waste-warn-1", "no-prod-2"]);
    assert!(alerts[0].message.contains("threshold is 25%"));
}

#[tokio::test]
async fn test_factory_kpis() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    seed(&db_path).await;

    let kpis = AlertApi::new(&db_path)
        .unwrap()
        .factory_kpis(d("2024-01-20"))
        .await
        .unwrap();
    assert_eq!(kpis.len(), 2);

    let north = &kpis[0];
    assert_eq!(north.factory_id, NORTH);
    assert_eq!(north.total_heads, 100);
    assert_eq!(north.total_waste, 20);
    assert!(approx(north.waste_pct, 20.0));
    assert!(approx(north.input_kg, 300.0));
    assert!(approx(north.output_kg, 158.0));
    assert!(approx(north.halak_yield_pct, 54.0));
    assert!(approx(north.muchshar_yield_pct, 50.0));
    assert!(approx(north.steak_pct, 8.0));

    let south = &kpis[1];
    assert_eq!(south.factory_name, "דרום");
    assert_eq!(south.total_waste, 13);
    assert_eq!(south.input_kg, 0.0);
    assert_eq!(south.yield_pct, 0.0);
}
