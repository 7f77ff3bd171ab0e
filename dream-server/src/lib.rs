//! Dream Decoder API Server
//!
//! Accepts signal uploads, runs them through `dream-core` and keeps a
//! history of predictions.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     DREAM DECODER API                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐  ┌──────────────┐  ┌──────────────────────┐  │
//! │  │ API (Axum) │─►│ AnalysisPool │─►│ dream-core Analyzer  │  │
//! │  │ rate limit │  │ (semaphore + │  │ ingest → bands →     │  │
//! │  │ cors, gzip │  │  blocking)   │  │ classify → response  │  │
//! │  └─────┬──────┘  └──────────────┘  └──────────────────────┘  │
//! │        ▼                                                     │
//! │  ┌──────────────────────────┐                                │
//! │  │ HistoryStore             │                                │
//! │  │ PostgreSQL | in-memory   │                                │
//! │  └──────────────────────────┘                                │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod store;
pub mod worker;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::Config;
pub use error::{AppError, AppResult};
pub use middleware::rate_limit::RateLimiter;
pub use store::HistoryStore;
pub use worker::{AnalysisPool, ModelState};

/// Headroom for multipart boundaries and the `user` field
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub analysis: AnalysisPool,
    pub store: HistoryStore,
    pub limiter: RateLimiter,
}

impl AppState {
    pub fn new(config: Config, analysis: AnalysisPool, store: HistoryStore) -> Self {
        let limiter = RateLimiter::new(config.rate_limit_per_minute)
            .trusting_forwarded_for(config.trust_forwarded_for);
        Self {
            config,
            analysis,
            store,
            limiter,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::check))
        .route("/health/", get(handlers::health::check))
        .route(
            "/predict",
            post(handlers::predict::predict).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/history", get(handlers::history::list))
        .route("/history/", get(handlers::history::list))
        .route("/eeg/analyze", post(handlers::eeg::analyze))
        .fallback(|| async { AppError::NotFound("Route not found".to_string()) })
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::enforce,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
