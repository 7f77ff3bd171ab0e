//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub db: bool,
    pub model: bool,
    pub version: &'static str,
    pub model_version: Option<String>,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub core_version: &'static str,
    pub history_backend: &'static str,
}

/// `ok` when storage and model are both up, `degraded` when one is, `down` when neither
fn overall_status(db_up: bool, model_up: bool) -> &'static str {
    match (db_up, model_up) {
        (true, true) => "ok",
        (false, false) => "down",
        _ => "degraded",
    }
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_up = state.store.ping().await;
    let model_up = state.analysis.is_ready();

    Json(HealthResponse {
        status: overall_status(db_up, model_up),
        db: db_up,
        model: model_up,
        version: env!("CARGO_PKG_VERSION"),
        model_version: state.analysis.model_version().map(str::to_string),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

pub async fn index(State(state): State<AppState>) -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Dream Decoder API is running",
        version: env!("CARGO_PKG_VERSION"),
        core_version: dream_core::constants::CORE_VERSION,
        history_backend: state.store.backend(),
    })
}
