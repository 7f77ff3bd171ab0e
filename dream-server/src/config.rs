//! Configuration module

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use dream_core::constants::{
    DEFAULT_HISTORY_CAPACITY, DEFAULT_MAX_SAMPLES, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_MIN_ACTIVE_BANDS,
    DEFAULT_MIN_SAMPLES, DEFAULT_MODEL_VERSION, DEFAULT_SAMPLE_RATE_HZ, DEFAULT_SEGMENT_LEN,
    DEFAULT_SIGNAL_PREVIEW_LEN,
};
use dream_core::{AnalyzerConfig, ConfigError, IngestLimits, SpectralConfig};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// PostgreSQL URL; history stays in memory when unset
    pub database_url: Option<String>,

    /// Environment (development, production)
    pub environment: String,

    /// Weight file; built-in weights when unset
    pub model_path: Option<PathBuf>,

    /// Version reported for the built-in weights
    pub model_version: String,

    /// Assumed sampling rate of uploads (Hz)
    pub sample_rate_hz: f64,

    /// Spectral estimate window (samples)
    pub min_samples: usize,

    /// Welch segment length (samples)
    pub segment_len: usize,

    pub min_active_bands: usize,

    pub max_upload_bytes: usize,

    pub max_samples: usize,

    /// Points echoed in the `signal` field of `/predict`
    pub signal_preview_len: usize,

    pub request_timeout_secs: u64,

    /// How long a request may wait for a free worker
    pub queue_timeout_ms: u64,

    pub worker_threads: usize,

    /// Capacity of the in-memory history
    pub history_capacity: usize,

    /// Requests per client IP per minute; 0 disables limiting
    pub rate_limit_per_minute: u32,

    /// Key rate limiting on `X-Forwarded-For` instead of the socket peer
    pub trust_forwarded_for: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            database_url: None,
            environment: "development".to_string(),
            model_path: None,
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            min_samples: DEFAULT_MIN_SAMPLES,
            segment_len: DEFAULT_SEGMENT_LEN,
            min_active_bands: DEFAULT_MIN_ACTIVE_BANDS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_samples: DEFAULT_MAX_SAMPLES,
            signal_preview_len: DEFAULT_SIGNAL_PREVIEW_LEN,
            request_timeout_secs: 15,
            queue_timeout_ms: 2_000,
            worker_threads: default_worker_threads(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            rate_limit_per_minute: 100,
            trust_forwarded_for: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: parse_env("PORT", defaults.port),

            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),

            model_path: env::var("MODEL_PATH")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),

            model_version: env::var("MODEL_VERSION").unwrap_or(defaults.model_version),

            sample_rate_hz: parse_env("SAMPLE_RATE_HZ", defaults.sample_rate_hz),
            min_samples: parse_env("MIN_SAMPLES", defaults.min_samples),
            segment_len: parse_env("SEGMENT_LEN", defaults.segment_len),
            min_active_bands: parse_env("MIN_ACTIVE_BANDS", defaults.min_active_bands),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            max_samples: parse_env("MAX_SAMPLES", defaults.max_samples),
            signal_preview_len: parse_env("SIGNAL_PREVIEW_LEN", defaults.signal_preview_len),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            queue_timeout_ms: parse_env("QUEUE_TIMEOUT_MS", defaults.queue_timeout_ms),
            worker_threads: parse_env("WORKER_THREADS", defaults.worker_threads),
            history_capacity: parse_env("HISTORY_CAPACITY", defaults.history_capacity),
            rate_limit_per_minute: parse_env("RATE_LIMIT_PER_MINUTE", defaults.rate_limit_per_minute),
            trust_forwarded_for: parse_env("TRUST_FORWARDED_FOR", defaults.trust_forwarded_for),
        }
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.spectral_config().validate()?;
        if self.worker_threads == 0 {
            return Err(ConfigError("WORKER_THREADS must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError("REQUEST_TIMEOUT_SECS must be at least 1".to_string()));
        }
        if self.max_upload_bytes == 0 || self.max_samples == 0 {
            return Err(ConfigError("upload limits must be positive".to_string()));
        }
        Ok(())
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn spectral_config(&self) -> SpectralConfig {
        SpectralConfig {
            sample_rate_hz: self.sample_rate_hz,
            min_samples: self.min_samples,
            segment_len: self.segment_len,
        }
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            ingest: IngestLimits {
                max_upload_bytes: self.max_upload_bytes,
                max_samples: self.max_samples,
            },
            spectral: self.spectral_config(),
            preview_len: self.signal_preview_len,
            min_active_bands: self.min_active_bands,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn queue_timeout(&self) -> Duration {
        Duration::from_millis(self.queue_timeout_ms)
    }
}

fn default_worker_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
}

/// Read `key`, falling back to `default` when unset or unparsable
fn parse_env<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
