//! COM:PASS - coaching platform backend

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use compass::{config::Args, db::Db, server, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("compass={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // Print startup banner
    info!("======================================");
    info!("  COM:PASS coaching platform backend");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!("Database: {}", args.database_path);
    info!(
        "Auth: {}",
        if args.skip_auth { "SKIPPED (mock user)" } else { "JWT" }
    );
    info!(
        "Email: {}",
        args.email_api_url.as_deref().unwrap_or("disabled")
    );
    info!("======================================");

    // Open the SQLite database and run schema setup
    let db = match Db::open(&args.database_path) {
        Ok(db) => {
            info!("Database opened at {}", args.database_path);
            db
        }
        Err(e) => {
            error!("Database open failed: {}", e);
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState::new(args, db));

    // Run the server
    if let Err(e) = server::run(state).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
