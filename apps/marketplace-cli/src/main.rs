//! # Marketplace CLI
//!
//! Places and inspects orders against a local SQLite database.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        marketplace (binary)                             │
//! │                                                                         │
//! │  args ──► Command::parse ──► AppConfig::load ──► init_tracing          │
//! │                                     │                                   │
//! │                                     ▼                                   │
//! │                          Database::new (migrations)                     │
//! │                                     │                                   │
//! │                                     ▼                                   │
//! │                   commands::execute ──► JSON on stdout                  │
//! │                                     │                                   │
//! │                                     └── ErrorResponse ──► exit 1        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod commands;
mod config;
mod error;

use std::env;
use std::process::ExitCode;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::commands::{Command, USAGE};
use crate::config::AppConfig;
use crate::error::ErrorResponse;
use marketplace_db::Database;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    let command = match Command::parse(&args) {
        Ok(Command::Help) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Ok(command) => command,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!();
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    match run(command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ErrorResponse>() {
                Some(response) => match serde_json::to_string_pretty(response) {
                    Ok(json) => println!("{}", json),
                    Err(_) => eprintln!("error: {}", response),
                },
                None => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.log_filter);

    info!(
        path = %config.database_path.display(),
        max_connections = config.max_connections,
        "Configuration loaded"
    );

    let db = Database::new(config.db_config())
        .await
        .context("Failed to open database")?;

    let result = commands::execute(command, &db).await;
    db.close().await;

    let output = result?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG` wins when set
/// - Otherwise the configured `log_filter`
///
/// Logs go to stderr so stdout stays valid JSON.
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
