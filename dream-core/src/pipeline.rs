//! Analysis Pipeline
//!
//! ```text
//! bytes ──► SignalIngest ──► BandPowerExtractor ──► DreamClassifier ──► PredictionResponse
//! ```
//!
//! Linear, synchronous and CPU-bound. An [`Analyzer`] holds no mutable state,
//! so one instance can be shared by every worker thread.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::{DEFAULT_MIN_ACTIVE_BANDS, DEFAULT_SIGNAL_PREVIEW_LEN};
use crate::error::{AnalysisResult, ConfigError};
use crate::model::{Classification, DreamClassifier, ModelWeights};
use crate::response::PredictionResponse;
use crate::signal::{IngestLimits, SignalIngest, SignalQuality, SignalSeries, SignalStats};
use crate::spectral::{Band, BandPowerExtractor, BandPowerSet, SpectralConfig};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub ingest: IngestLimits,
    pub spectral: SpectralConfig,
    /// Points echoed back in the response `signal` field
    pub preview_len: usize,
    pub min_active_bands: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            ingest: IngestLimits::default(),
            spectral: SpectralConfig::default(),
            preview_len: DEFAULT_SIGNAL_PREVIEW_LEN,
            min_active_bands: DEFAULT_MIN_ACTIVE_BANDS,
        }
    }
}

/// Everything one analysis produced
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// SHA-256 (hex) of the analysed input
    pub fingerprint: String,
    pub model_version: String,
    pub sample_count: usize,
    pub stats: SignalStats,
    pub bands: BandPowerSet,
    pub classification: Classification,
    pub response: PredictionResponse,
}

impl Analysis {
    pub fn dominant_band(&self) -> Band {
        self.bands.dominant()
    }
}

/// Band breakdown and statistics without classification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalDescription {
    pub bands: BandPowerSet,
    pub statistics: SignalStats,
    pub quality: SignalQuality,
    pub dominant_band: Band,
}

#[derive(Debug, Clone)]
pub struct Analyzer {
    ingest: SignalIngest,
    extractor: BandPowerExtractor,
    classifier: DreamClassifier,
    preview_len: usize,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            ingest: SignalIngest::default(),
            extractor: BandPowerExtractor::default(),
            classifier: DreamClassifier::default(),
            preview_len: DEFAULT_SIGNAL_PREVIEW_LEN,
        }
    }
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig, weights: ModelWeights) -> Result<Self, ConfigError> {
        config.spectral.validate()?;
        weights
            .validate()
            .map_err(|e| ConfigError(e.to_string()))?;

        Ok(Self {
            ingest: SignalIngest::new(config.ingest),
            extractor: BandPowerExtractor::new(config.spectral),
            classifier: DreamClassifier::new(weights, config.spectral.sample_rate_hz)
                .with_min_active_bands(config.min_active_bands),
            preview_len: config.preview_len,
        })
    }

    pub fn model_version(&self) -> &str {
        self.classifier.model_version()
    }

    /// Full pipeline over raw upload bytes.
    pub fn analyze(&self, raw: &[u8]) -> AnalysisResult<Analysis> {
        let series = self.ingest.parse(raw)?;
        self.run(&series, fingerprint_bytes(raw))
    }

    /// Full pipeline over an already-decoded series.
    pub fn analyze_series(&self, series: &SignalSeries) -> AnalysisResult<Analysis> {
        self.run(series, fingerprint_series(series))
    }

    pub fn describe(&self, series: &SignalSeries) -> AnalysisResult<SignalDescription> {
        describe(&self.extractor, series)
    }

    fn run(&self, series: &SignalSeries, fingerprint: String) -> AnalysisResult<Analysis> {
        let bands = self.extractor.extract(series)?;
        let stats = SignalStats::compute(series);
        let classification = self.classifier.classify(&bands, &stats)?;
        let response = PredictionResponse::build(series, bands, &classification, self.preview_len);

        log::info!(
            "Analysis complete: {} samples → {} ({:.2}%), dominant band {}",
            series.len(),
            classification.label,
            response.confidence,
            bands.dominant()
        );

        Ok(Analysis {
            fingerprint,
            model_version: self.classifier.model_version().to_string(),
            sample_count: series.len(),
            stats,
            bands,
            classification,
            response,
        })
    }
}

/// Bands, statistics and quality grade of `series`, no classification.
pub fn describe(extractor: &BandPowerExtractor, series: &SignalSeries) -> AnalysisResult<SignalDescription> {
    let bands = extractor.extract(series)?;
    let statistics = SignalStats::compute(series);
    Ok(SignalDescription {
        bands,
        quality: statistics.quality(),
        statistics,
        dominant_band: bands.dominant(),
    })
}

fn fingerprint_bytes(raw: &[u8]) -> String {
    hex::encode(Sha256::digest(raw))
}

fn fingerprint_series(series: &SignalSeries) -> String {
    let mut hasher = Sha256::new();
    for v in series.as_slice() {
        hasher.update(v.to_le_bytes());
    }
    hex::encode(hasher.finalize())
}

// ============================================================================
// TESTS
// ============================================================================
