//! Thoughts - share short thoughts, publicly or privately

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use thoughts::{
    config::Args,
    db::{MongoClient, MongoStore},
    server::{self, AppState, StorageBackend},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("thoughts={},info", log_level).into());
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Thoughts");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {} (db: {})", args.mongodb_uri, args.mongodb_db);
    info!(
        "Google OAuth: {}",
        if args.google.is_configured() { "enabled" } else { "disabled" }
    );
    info!("======================================");

    // Connect to MongoDB (in dev mode, fall back to memory)
    let mongo_store = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => MongoStore::new(&client).await,
        Err(e) => Err(e),
    };

    let state = match mongo_store {
        Ok(store) => {
            info!("MongoDB connected successfully");
            let store = Arc::new(store);
            AppState::new(args, store.clone(), store, StorageBackend::MongoDb)
        }
        Err(e) if args.dev_mode => {
            warn!("MongoDB unavailable (dev mode, using in-memory store): {}", e);
            AppState::in_memory(args)
        }
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            std::process::exit(1);
        }
    };

    let state = match state {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to initialize: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server::run(state).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
