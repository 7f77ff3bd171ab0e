//! Database module - PostgreSQL connection and migrations

use sqlx::{postgres::PgPoolOptions, PgPool};

/// Create database connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;

    tracing::info!("Database schema applied successfully");
    Ok(())
}

/// Liveness probe
pub async fn ping(pool: &PgPool) -> bool {
    sqlx::query("SELECT 1").execute(pool).await.is_ok()
}

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
-- Prediction history (confidence stored on the 0-1 scale)
CREATE TABLE IF NOT EXISTS predictions (
    id UUID PRIMARY KEY,
    dream VARCHAR(64) NOT NULL,
    confidence DOUBLE PRECISION NOT NULL,
    dominant_band VARCHAR(16) NOT NULL,
    bands JSONB NOT NULL,
    user_name VARCHAR(255) NOT NULL,
    model_version VARCHAR(128) NOT NULL,
    fingerprint CHAR(64) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_predictions_created ON predictions(created_at);
CREATE INDEX IF NOT EXISTS idx_predictions_fingerprint ON predictions(fingerprint);
"#;
