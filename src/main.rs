//! DocVault Server: versioned document storage with per-document sharing.
//!
//! Main entry point that loads configuration, sets up logging, prepares
//! the database, and starts the HTTP server.

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use docvault_core::config::AppConfig;
use docvault_database::DatabasePool;
use docvault_database::migration::run_migrations;

#[tokio::main]
async fn main() {
    let env = std::env::var("DOCVAULT_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = format!("{e:#}"), "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting DocVault v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!(url = %config.database.url, "Connecting to database...");
    let db = DatabasePool::connect(&config.database)
        .await
        .context("Database connection failed")?;
    run_migrations(db.pool()).await.context("Migration failed")?;

    // ── Step 2: Serve until shutdown ─────────────────────────────
    let pool = db.into_pool();
    docvault_api::run_server(config, pool.clone())
        .await
        .context("HTTP server failed")?;

    // ── Step 3: Release the database ─────────────────────────────
    pool.close().await;
    tracing::info!("DocVault server shut down gracefully");
    Ok(())
}
