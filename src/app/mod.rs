// ==========================================
// Meat Production Analytics - application layer
// ==========================================
// Shared state wiring the APIs to one database connection.
// ==========================================

pub mod state;

pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
