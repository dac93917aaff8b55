// ==========================================
// Meat Production Analytics - SQLite setup
// ==========================================
// - every connection gets the same PRAGMAs (foreign keys, busy timeout)
// - init_schema creates all tables idempotently
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// Default busy_timeout (ms)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// schema_version written by `init_schema`
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Apply per-connection PRAGMAs. foreign_keys and busy_timeout are not persistent.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a connection and apply the standard PRAGMAs.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Read schema_version (None when the table does not exist yet).
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_scope (
    scope_id TEXT PRIMARY KEY,
    scope_type TEXT NOT NULL,
    scope_key TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(scope_type, scope_key)
);

INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
VALUES ('global', 'GLOBAL', 'global');

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

-- ===== reference data =====

CREATE TABLE IF NOT EXISTS factories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    name_hebrew TEXT,
    active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS kosher_families (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    family TEXT NOT NULL,
    name_hebrew TEXT,
    family_hebrew TEXT
);

CREATE TABLE IF NOT EXISTS customers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    name_hebrew TEXT,
    active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS products (
    item_id TEXT PRIMARY KEY,
    name_hebrew TEXT NOT NULL,
    name_foreign TEXT,
    kosher_id INTEGER REFERENCES kosher_families(id),
    department TEXT,
    is_anatomical INTEGER NOT NULL DEFAULT 0,
    is_steak INTEGER NOT NULL DEFAULT 0,
    freshness TEXT,
    breed TEXT,
    bone_waste_percentage REAL,
    customer_id INTEGER REFERENCES customers(id),
    active INTEGER NOT NULL DEFAULT 1
);

-- ===== slaughter =====

CREATE TABLE IF NOT EXISTS slaughter_batches (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    factory_id INTEGER NOT NULL REFERENCES factories(id) ON DELETE RESTRICT,
    date TEXT NOT NULL,
    cows_count INTEGER NOT NULL DEFAULT 0 CHECK (cows_count >= 0),
    bulls_count INTEGER NOT NULL DEFAULT 0 CHECK (bulls_count >= 0),
    halak_count INTEGER NOT NULL DEFAULT 0 CHECK (halak_count >= 0),
    muchshar_count INTEGER NOT NULL DEFAULT 0 CHECK (muchshar_count >= 0),
    waste_lungs INTEGER NOT NULL DEFAULT 0 CHECK (waste_lungs >= 0),
    waste_inner INTEGER NOT NULL DEFAULT 0 CHECK (waste_inner >= 0),
    waste_outer INTEGER NOT NULL DEFAULT 0 CHECK (waste_outer >= 0),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(factory_id, date)
);

-- ===== production =====

CREATE TABLE IF NOT EXISTS work_orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    factory_id INTEGER NOT NULL REFERENCES factories(id) ON DELETE RESTRICT,
    production_date TEXT NOT NULL,
    halak_quarters_in REAL NOT NULL DEFAULT 0,
    kosher_quarters_in REAL NOT NULL DEFAULT 0,
    halak_weight_in_kg REAL NOT NULL DEFAULT 0,
    kosher_weight_in_kg REAL NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(factory_id, production_date)
);

CREATE TABLE IF NOT EXISTS production_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    work_order_id INTEGER NOT NULL REFERENCES work_orders(id) ON DELETE CASCADE,
    item_id TEXT NOT NULL REFERENCES products(item_id),
    units REAL NOT NULL DEFAULT 0,
    boxes REAL NOT NULL DEFAULT 0,
    weight_kg REAL NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_production_records_work_order
    ON production_records(work_order_id);

CREATE TABLE IF NOT EXISTS production_sources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    work_order_id INTEGER NOT NULL UNIQUE REFERENCES work_orders(id) ON DELETE CASCADE,
    slaughter_batch_id INTEGER NOT NULL UNIQUE REFERENCES slaughter_batches(id) ON DELETE RESTRICT
);

-- ===== audit =====

CREATE TABLE IF NOT EXISTS import_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    batch_ref TEXT NOT NULL,
    file_name TEXT NOT NULL,
    upload_type TEXT NOT NULL,
    factory_id INTEGER,
    status TEXT NOT NULL DEFAULT 'processing',
    rows_imported INTEGER NOT NULL DEFAULT 0,
    error_details TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// Create every table the crate uses (idempotent) and record the schema version.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}
