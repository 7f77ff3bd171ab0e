//! Prediction history model

use chrono::{DateTime, Utc};
use dream_core::{Analysis, BandPowerSet};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_HISTORY_LIMIT: i64 = 30;

/// One stored prediction. `confidence` is on the 0-1 scale.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PredictionRecord {
    pub id: Uuid,
    pub dream: String,
    pub confidence: f64,
    pub dominant_band: String,
    pub bands: Json<BandPowerSet>,
    #[sqlx(rename = "user_name")]
    pub user: String,
    pub model_version: String,
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, Default)]
pub struct HistoryFilter {
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl HistoryFilter {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_HISTORY_LIMIT)
    }
}

impl PredictionRecord {
    pub fn from_analysis(analysis: &Analysis, user: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            dream: analysis.classification.label.as_str().to_string(),
            confidence: analysis.classification.confidence,
            dominant_band: analysis.dominant_band().as_str().to_string(),
            bands: Json(analysis.bands),
            user: user.to_string(),
            model_version: analysis.model_version.clone(),
            fingerprint: analysis.fingerprint.clone(),
            created_at: Utc::now(),
        }
    }

    pub async fn insert(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO predictions (id, dream, confidence, dominant_band, bands, user_name, model_version, fingerprint, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(self.id)
        .bind(&self.dream)
        .bind(self.confidence)
        .bind(&self.dominant_band)
        .bind(&self.bands)
        .bind(&self.user)
        .bind(&self.model_version)
        .bind(&self.fingerprint)
        .bind(self.created_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, PredictionRecord>(
            r#"
            SELECT id, dream, confidence, dominant_band, bands, user_name, model_version, fingerprint, created_at
            FROM predictions
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
