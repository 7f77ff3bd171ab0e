//! History storage
//!
//! Postgres when `DATABASE_URL` is configured, otherwise a bounded
//! in-memory log that forgets on restart.

use std::sync::Arc;

use dream_core::SessionLog;
use parking_lot::RwLock;
use sqlx::PgPool;

use crate::db;
use crate::models::PredictionRecord;

#[derive(Debug, Clone)]
pub enum HistoryStore {
    Memory(Arc<RwLock<SessionLog<PredictionRecord>>>),
    Postgres(PgPool),
}

impl HistoryStore {
    pub fn in_memory(capacity: usize) -> Self {
        HistoryStore::Memory(Arc::new(RwLock::new(SessionLog::with_capacity(capacity))))
    }

    pub fn backend(&self) -> &'static str {
        match self {
            HistoryStore::Memory(_) => "memory",
            HistoryStore::Postgres(_) => "postgres",
        }
    }

    pub async fn insert(&self, record: PredictionRecord) -> Result<(), sqlx::Error> {
        match self {
            HistoryStore::Memory(log) => {
                log.write().push(record);
                Ok(())
            }
            HistoryStore::Postgres(pool) => record.insert(pool).await,
        }
    }

    /// Newest first
    pub async fn recent(&self, limit: usize) -> Result<Vec<PredictionRecord>, sqlx::Error> {
        match self {
            HistoryStore::Memory(log) => Ok(log.read().recent(limit).cloned().collect()),
            HistoryStore::Postgres(pool) => PredictionRecord::list_recent(pool, limit as i64).await,
        }
    }

    pub async fn ping(&self) -> bool {
        match self {
            HistoryStore::Memory(_) => true,
            HistoryStore::Postgres(pool) => db::ping(pool).await,
        }
    }
}
