//! Central Configuration Constants
//!
//! Single source of truth for analysis defaults.
//! The server overrides these from its environment.

/// Assumed sampling rate of uploaded signals (Hz)
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 250.0;

/// Spectral estimate window: minimum samples needed for a stable PSD
pub const DEFAULT_MIN_SAMPLES: usize = 128;

/// Welch segment length (samples)
pub const DEFAULT_SEGMENT_LEN: usize = 256;

/// Upload ceiling in bytes (5 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Upload ceiling in parsed samples
pub const DEFAULT_MAX_SAMPLES: usize = 100_000;

/// Number of points echoed back in the `signal` field
pub const DEFAULT_SIGNAL_PREVIEW_LEN: usize = 200;

/// Bands that must carry power before the classifier will answer
pub const DEFAULT_MIN_ACTIVE_BANDS: usize = 1;

/// Default capacity of the in-memory result log
pub const DEFAULT_HISTORY_CAPACITY: usize = 30;

/// Identifier of the built-in model weights
pub const DEFAULT_MODEL_VERSION: &str = "spectral-softmax-v1";

/// Smallest accepted `min_samples` / segment length
pub const MIN_SEGMENT_LEN: usize = 8;

/// Library version
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");
