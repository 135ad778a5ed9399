use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shiftswap_axum::{
    db, handlers, startup,
    store::{MemorySwapStore, PgSwapStore},
    AppConfig, AppState, StoreBackend, SwapStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables before reading RUST_LOG / LOG_FORMAT
    dotenvy::dotenv().ok();

    // Initialize tracing with conditional JSON/text output
    let use_json = std::env::var("LOG_FORMAT")
        .unwrap_or_else(|_| "text".to_string()) == "json";

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,shiftswap_axum=debug,tower_http=debug".into());

    if use_json {
        // Structured JSON logging for production
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Human-readable for development
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration error: {}", e);
        e
    })?;

    let store: Arc<dyn SwapStore> = match &config.store {
        StoreBackend::Postgres { database_url } => {
            let pool = db::create_pool(database_url).await.map_err(|e| {
                tracing::error!("Failed to create database pool: {}", e);
                e
            })?;
            tracing::info!("Database pool created successfully");

            db::run_migrations(&pool).await.map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                e
            })?;
            tracing::info!("Database migrations applied");

            Arc::new(PgSwapStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemorySwapStore::new())
        }
    };

    // Initialize metrics recorder
    let metrics_state = Arc::new(handlers::setup_metrics_recorder()?);
    tracing::info!("Metrics recorder initialized");

    let bind_addr = config.bind_addr.clone();
    let auto_complete = config.auto_complete_swaps;
    let state = Arc::new(AppState::new(config, store, metrics_state));

    // Build router
    let app = startup::build_router(state)?;

    // Start server
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!(auto_complete, "Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
