//! Dream Decoder API server binary

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dream_server::{create_router, db, AnalysisPool, AppState, Config, HistoryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    // Load configuration
    let config = Config::from_env();
    config.validate().context("Invalid configuration")?;

    tracing::info!("Dream Decoder server starting ({})...", config.environment);

    let store = match &config.database_url {
        Some(url) => {
            tracing::info!("Database: {}", url.rsplit('@').next().unwrap_or("***"));
            let pool = db::create_pool(url)
                .await
                .context("Failed to create database pool")?;

            tracing::info!("Running database migrations...");
            db::run_migrations(&pool)
                .await
                .context("Failed to run migrations")?;
            HistoryStore::Postgres(pool)
        }
        None => {
            if config.is_production() {
                tracing::error!("Production environment without DATABASE_URL: history will not survive restarts");
            }
            tracing::warn!(
                "DATABASE_URL not set, keeping the last {} predictions in memory",
                config.history_capacity
            );
            HistoryStore::in_memory(config.history_capacity)
        }
    };

    let analysis = AnalysisPool::from_config(&config);
    if !analysis.is_ready() {
        tracing::warn!("Serving without a model: /predict will answer 503");
    }

    let state = AppState::new(config.clone(), analysis, store);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Human-readable output unless `LOG_FORMAT=json`
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dream_server=debug,dream_core=info,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
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
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
