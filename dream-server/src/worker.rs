//! Analysis worker pool
//!
//! Analysis is CPU-bound, so it runs on the blocking pool. A semaphore caps
//! how many analyses run at once; a request that cannot get a slot within
//! the queue timeout is turned away instead of piling up.

use std::sync::Arc;
use std::time::Duration;

use dream_core::{AnalysisError, Analyzer, ModelWeights};
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Whether the classifier is ready to serve
#[derive(Debug, Clone)]
pub enum ModelState {
    Ready(Arc<Analyzer>),
    Unavailable(Arc<str>),
}

#[derive(Debug, Clone)]
pub struct AnalysisPool {
    model: ModelState,
    permits: Arc<Semaphore>,
    queue_timeout: Duration,
    request_timeout: Duration,
}

impl AnalysisPool {
    pub fn new(model: ModelState, config: &Config) -> Self {
        Self {
            model,
            permits: Arc::new(Semaphore::new(config.worker_threads.max(1))),
            queue_timeout: config.queue_timeout(),
            request_timeout: config.request_timeout(),
        }
    }

    /// Load weights (file or built-in) and build the shared analyzer.
    /// Load failures leave the pool up with the model marked unavailable.
    pub fn from_config(config: &Config) -> Self {
        let weights = match &config.model_path {
            Some(path) => ModelWeights::load_from_file(path),
            None => Ok(ModelWeights::builtin(&config.model_version)),
        };

        let model = match weights {
            Ok(weights) => match Analyzer::new(config.analyzer_config(), weights) {
                Ok(analyzer) => {
                    tracing::info!("Model {} loaded", analyzer.model_version());
                    ModelState::Ready(Arc::new(analyzer))
                }
                Err(e) => {
                    tracing::error!("Analyzer rejected configuration: {}", e);
                    ModelState::Unavailable(e.to_string().into())
                }
            },
            Err(e) => {
                tracing::error!("Failed to load model: {}", e);
                ModelState::Unavailable(e.to_string().into())
            }
        };

        Self::new(model, config)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.model, ModelState::Ready(_))
    }

    pub fn model_version(&self) -> Option<&str> {
        match &self.model {
            ModelState::Ready(analyzer) => Some(analyzer.model_version()),
            ModelState::Unavailable(_) => None,
        }
    }

    pub fn analyzer(&self) -> AppResult<Arc<Analyzer>> {
        match &self.model {
            ModelState::Ready(analyzer) => Ok(Arc::clone(analyzer)),
            ModelState::Unavailable(reason) => Err(AppError::ModelUnavailable(reason.to_string())),
        }
    }

    /// Run `job` on a worker thread once a slot frees up
    pub async fn run<T, F>(&self, job: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, AnalysisError> + Send + 'static,
    {
        let permit = tokio::time::timeout(self.queue_timeout, Arc::clone(&self.permits).acquire_owned())
            .await
            .map_err(|_| {
                tracing::warn!("No analysis worker free within {:?}", self.queue_timeout);
                AppError::QueueFull
            })?
            .map_err(|_| AppError::InternalError("Analysis pool closed".to_string()))?;

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        });

        // On timeout the worker keeps its slot until the job actually ends
        match tokio::time::timeout(self.request_timeout, handle).await {
            Err(_) => Err(AppError::Timeout),
            Ok(Err(join)) => Err(AppError::InternalError(format!("Analysis task failed: {}", join))),
            Ok(Ok(result)) => result.map_err(AppError::from),
        }
    }
}
