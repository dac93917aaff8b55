// ==========================================
// Product catalog upload and import history
// ==========================================


use meat_analytics::api::UploadApi;
use meat_analytics::domain::types::{ImportStatus, UploadType};
use meat_analytics::logging;
use test_helpers::*;

const CATALOG_HEADER: &[&str] = &[
    "Barcode",
    "Hebrew name",
    "Foreign name",
    "Kosher",
    "Department",
    "X9",
    "Steak",
    "Freshness",
    "Breed",
    "Bone waste %",
    "Customer",
];

fn catalog_payload() -> String {
    csv_payload(&[
        cells(CATALOG_HEADER),
        cells(&["7300001", "אנטריקוט", "Ribeye", "Halak", "Carne", "1", "0", "fresh", "Angus", "12.5", "Acme Foods"]),
        cells(&["7300002", "צלי", "", "Kosher", "butchery", "0", "yes", "קפוא", "", "", "Gone Ltd"]),
        cells(&["7300003", "שריר", "", "Treif", "carne", "0", "0", "", "", "", ""]),
        cells(&[KNOWN_ITEMS[0], "קיים", "", "חלק", "carne", "1", "0", "", "", "", ""]),
    ])
}

#[tokio::test]
async fn test_preview_flags_rows_without_writing() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = UploadApi::new(&db_path).unwrap();

    let preview = api.preview_products(&catalog_payload()).await.unwrap();
    assert_eq!(preview.rows.len(), 4);
    assert_eq!(preview.error_count(), 1);
    assert_eq!(preview.warning_count(), 1);
    assert!(preview.defaulted_columns.is_empty());

    let first = &preview.rows[0];
    assert_eq!(first.kosher_id, Some(1));
    assert_eq!(first.customer_id, Some(1));
    assert_eq!(first.department, "carne");
    assert!(first.is_anatomical);
    assert_eq!(first.bone_waste_percentage, Some(12.5));

    let second = &preview.rows[1];
    assert!(second.is_steak);
    assert_eq!(second.freshness, "frozen");
    assert_eq!(second.customer_id, None);
    assert_eq!(second.warnings.len(), 2);

    let third = &preview.rows[2];
    assert_eq!(third.row, 4);
    assert_eq!(third.errors, vec!["Unknown kosher classification: \"Treif\"".to_string()]);

    assert_eq!(count_rows(&db_path, "products"), KNOWN_ITEMS.len() as i64);
}

#[tokio::test]
async fn test_upload_is_insert_or_ignore() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = UploadApi::new(&db_path).unwrap();

    let first = api.upload_products("catalog.xlsx", &catalog_payload()).await.unwrap();
    assert!(first.success);
    assert_eq!(first.inserted, 2);
    assert_eq!(first.skipped, 1);
    assert_eq!(first.status, ImportStatus::Success);
    assert_eq!(count_rows(&db_path, "products"), KNOWN_ITEMS.len() as i64 + 2);

    let customer: Option<i64> = open_conn(&db_path)
        .query_row(
            "SELECT customer_id FROM products WHERE item_id = '7300002'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(customer, None);

    // existing rows are never overwritten
    let again = api.upload_products("catalog.xlsx", &catalog_payload()).await.unwrap();
    assert!(again.success);
    assert_eq!(again.inserted, 0);
    assert_eq!(again.skipped, 3);
}

#[tokio::test]
async fn test_upload_with_only_invalid_rows_fails() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = UploadApi::new(&db_path).unwrap();

    let payload = csv_payload(&[
        cells(CATALOG_HEADER),
        cells(&["", "שם", "", "Halak", "", "", "", "", "", "", ""]),
        cells(&["7300009", "", "", "", "", "", "", "", "", "", ""]),
    ]);
    let result = api.upload_products("bad.csv", &payload).await.unwrap();
    assert!(!result.success);
    assert_eq!(result.status, ImportStatus::Error);
    assert_eq!(result.errors, vec!["No valid rows to upload".to_string()]);
}

#[tokio::test]
async fn test_import_history_lists_newest_first() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = UploadApi::new(&db_path).unwrap();

    let slaughter = slaughter_payload(vec![slaughter_row("2024-01-15", [10, 0, 10, 0, 0, 0, 0, 0])]);
    api.upload_slaughter(SOUTH, "slaughter.csv", &slaughter).await.unwrap();
    api.upload_products("catalog.csv", &catalog_payload()).await.unwrap();

    let history = api.list_import_history(10).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].upload_type, UploadType::Products);
    assert_eq!(history[0].factory_id, None);
    assert_eq!(history[0].file_name, "catalog.csv");
    assert_eq!(history[1].upload_type, UploadType::Slaughter);
    assert_eq!(history[1].factory_id, Some(SOUTH));

    assert_eq!(api.list_import_history(1).await.unwrap().len(), 1);
    assert!(api.list_import_history(0).await.is_err());
}
