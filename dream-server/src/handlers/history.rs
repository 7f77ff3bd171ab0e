//! History handler

use axum::{extract::State, Json};
use validator::Validate;

use crate::extract::QueryParams;
use crate::models::{HistoryFilter, PredictionRecord};
use crate::{AppResult, AppState};

/// Recent predictions, newest first
pub async fn list(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<HistoryFilter>,
) -> AppResult<Json<Vec<PredictionRecord>>> {
    filter.validate()?;

    let records = state.store.recent(filter.limit() as usize).await?;
    Ok(Json(records))
}
