//! Savora Server
//!
//! HTTP backend for a surplus-food marketplace: vendor offer inventory,
//! reservation lifecycle, and the no-show penalty / self-unblock flow.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::{ConfigLoader, get_database_url};
use savora_core::events::audit_event_channel;
use savora_core::processors::{AuditWriter, ExpirySweeper};
use server::{build_router, run_server};
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Savora - surplus-food marketplace backend
#[derive(Parser, Debug)]
#[command(name = "savora-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./savora-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting savora-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = ConfigLoader::new(&args.config, args.listen);
    let runtime_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = runtime_config.listen;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // Get database URL from environment
    let database_url = get_database_url().map_err(|e| {
        tracing::error!("DATABASE_URL environment variable not set");
        e
    })?;

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    // Run migrations if requested
    if args.migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&db_pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                e
            })?;
        tracing::info!("Migrations completed successfully");
    }

    // Shutdown channel shared by all background processors
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Audit side-channel: handlers send, the writer persists
    let (audit_tx, audit_rx) = audit_event_channel();
    let audit_writer = AuditWriter::new(db_pool.clone(), audit_rx, shutdown_rx.clone());
    let audit_handle = tokio::spawn(audit_writer.run());

    // Expiry sweeper: reserved->expired and paid->no_show transitions
    let sweeper = ExpirySweeper::new(
        db_pool.clone(),
        runtime_config.sweeper.clone(),
        shutdown_rx.clone(),
    );
    let sweeper_handle = tokio::spawn(sweeper.run());

    // Create application state
    let state = AppState::new(db_pool.clone(), runtime_config, audit_tx);

    // Build the router
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Stop background processors
    tracing::info!("Stopping background processors...");
    let _ = shutdown_tx.send(true);
    let _ = sweeper_handle.await;
    let _ = audit_handle.await;

    // Close database connections gracefully
    tracing::info!("Closing database connections...");
    db_pool.close().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
