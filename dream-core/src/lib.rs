//! Dream Decoder analysis core
//!
//! Turns an uploaded EEG-like signal into relative band powers and a dream
//! classification.
//!
//! ```text
//! ┌──────────────┐   ┌────────────────────┐   ┌─────────────────┐   ┌────────────────────┐
//! │ SignalIngest │──►│ BandPowerExtractor │──►│ DreamClassifier │──►│ PredictionResponse │
//! └──────────────┘   └────────────────────┘   └─────────────────┘   └────────────────────┘
//! ```
//!
//! Every stage is pure and deterministic; [`Analyzer`] wires them together.

pub mod constants;
pub mod error;
pub mod history;
pub mod model;
pub mod pipeline;
pub mod response;
pub mod signal;
pub mod spectral;

pub use error::{AnalysisError, AnalysisResult, ConfigError, ErrorKind};
pub use history::SessionLog;
pub use model::{Classification, DreamClassifier, DreamLabel, ModelError, ModelWeights, ProbabilityDistribution};
pub use pipeline::{describe, Analysis, Analyzer, AnalyzerConfig, SignalDescription};
pub use response::PredictionResponse;
pub use signal::{IngestLimits, SignalIngest, SignalQuality, SignalSeries, SignalStats};
pub use spectral::{Band, BandPowerExtractor, BandPowerSet, BandSpectrum, SpectralConfig};
