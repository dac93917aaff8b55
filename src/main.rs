// ==========================================
// Meat Production Analytics - CLI entry point
// ==========================================
// Files are base64-encoded and go through the same API entry points as
// the web transport. Results are printed to stdout as pretty JSON.
// ==========================================

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use meat_analytics::app::{get_default_db_path, AppState};
use meat_analytics::importer::ProductionUploadRequest;
use meat_analytics::logging::{self, LogFormat};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "meat-analytics", version, about = "Slaughter and production report ingestion")]
struct Cli {
    /// SQLite database path (default: $MEAT_ANALYTICS_DB_PATH or the user data directory)
    #[arg(long, global = true)]
    db: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value = "false")]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database schema
    Init,

    /// Upload a slaughter report
    ImportSlaughter {
        #[arg(long)]
        factory: i64,
        file: PathBuf,
    },

    /// Upload a production report
    ImportProduction {
        #[arg(long)]
        factory: i64,
        /// Production date (YYYY-MM-DD); defaults to the Date row of the file
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Slaughter batch consumed by this production
        #[arg(long)]
        slaughter_batch: Option<i64>,
        file: PathBuf,
    },

    /// Upload the product catalog
    ImportProducts { file: PathBuf },

    /// Evaluate alerts
    Alerts {
        /// Reference day (YYYY-MM-DD); defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Per-factory KPIs
    Kpis {
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Unlinked slaughter batches available for a production upload
    Batches {
        #[arg(long)]
        factory: i64,
    },

    /// Recent import log entries
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_with(if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Text
    });

    let db_path = cli.db.unwrap_or_else(get_default_db_path);
    tracing::info!(version = meat_analytics::VERSION, db_path = %db_path, "starting");

    let state = AppState::new(db_path.clone())
        .with_context(|| format!("failed to open database {}", db_path))?;

    match cli.command {
        Command::Init => {
            print_json(&serde_json::json!({ "db_path": state.get_db_path(), "initialized": true }))?;
        }
        Command::ImportSlaughter { factory, file } => {
            let (file_name, payload) = encode_file(&file)?;
            let result = state
                .upload_api
                .upload_slaughter(factory, &file_name, &payload)
                .await?;
            print_json(&result)?;
        }
        Command::ImportProduction {
            factory,
            date,
            slaughter_batch,
            file,
        } => {
            let (file_name, payload) = encode_file(&file)?;
            let request = ProductionUploadRequest {
                factory_id: factory,
                file_name,
                payload,
                production_date: date,
                slaughter_batch_id: slaughter_batch,
            };
            let result = state.upload_api.upload_production(&request).await?;
            print_json(&result)?;
        }
        Command::ImportProducts { file } => {
            let (file_name, payload) = encode_file(&file)?;
            let result = state.upload_api.upload_products(&file_name, &payload).await?;
            print_json(&result)?;
        }
        Command::Alerts { as_of } => {
            let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
            print_json(&state.alert_api.alerts(as_of).await?)?;
        }
        Command::Kpis { as_of } => {
            let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
            print_json(&state.alert_api.factory_kpis(as_of).await?)?;
        }
        Command::Batches { factory } => {
            print_json(&state.upload_api.list_available_slaughter_batches(factory).await?)?;
        }
        Command::History { limit } => {
            print_json(&state.upload_api.list_import_history(limit).await?)?;
        }
    }

    Ok(())
}

/// Read a workbook from disk and return (file name, base64 payload).
fn encode_file(path: &Path) -> Result<(String, String)> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    Ok((file_name, STANDARD.encode(bytes)))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
