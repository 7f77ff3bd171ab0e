//! Prediction handler

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use dream_core::PredictionResponse;

use crate::models::PredictionRecord;
use crate::{AppError, AppResult, AppState};

const DEFAULT_USER: &str = "anonymous";

/// Classify an uploaded signal file
///
/// Multipart fields: `file` (required), `user` (optional).
pub async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<PredictionResponse>> {
    // Fail before reading the body if there is nothing to run it through
    let analyzer = state.analysis.analyzer()?;
    let mut multipart = multipart?;

    let mut file: Option<Vec<u8>> = None;
    let mut user: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => file = Some(field.bytes().await?.to_vec()),
            "user" => {
                let value = field.text().await?;
                let value = value.trim();
                if !value.is_empty() {
                    user = Some(value.to_string());
                }
            }
            _ => {}
        }
    }

    let raw = file.ok_or_else(|| AppError::ValidationError("Missing multipart field 'file'".to_string()))?;
    let user = user.unwrap_or_else(|| DEFAULT_USER.to_string());

    tracing::debug!("Received {} byte upload from {}", raw.len(), user);

    let analysis = state.analysis.run(move || analyzer.analyze(&raw)).await?;

    let record = PredictionRecord::from_analysis(&analysis, &user);
    let store = state.store.clone();
    tokio::spawn(async move {
        if let Err(e) = store.insert(record).await {
            tracing::warn!("Failed to persist prediction: {}", e);
        }
    });

    tracing::info!(
        "Predicted {} ({:.2}%) for {}",
        analysis.response.dream,
        analysis.response.confidence,
        user
    );

    Ok(Json(analysis.response))
}
