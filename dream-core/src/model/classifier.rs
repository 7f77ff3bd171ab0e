//! Dream Classifier
//!
//! Input: BandPowerSet + SignalStats. Output: Classification.
//! Deterministic: no clocks, no randomness, same input → same distribution.

use super::layout::FeatureVector;
use super::types::{Classification, DreamLabel, ProbabilityDistribution, LABEL_COUNT};
use super::weights::ModelWeights;
use crate::constants::{DEFAULT_MIN_ACTIVE_BANDS, DEFAULT_SAMPLE_RATE_HZ};
use crate::error::{AnalysisError, AnalysisResult};
use crate::signal::SignalStats;
use crate::spectral::BandPowerSet;

#[derive(Debug, Clone)]
pub struct DreamClassifier {
    weights: ModelWeights,
    sample_rate_hz: f64,
    min_active_bands: usize,
}

impl Default for DreamClassifier {
    fn default() -> Self {
        Self::new(ModelWeights::default(), DEFAULT_SAMPLE_RATE_HZ)
    }
}

impl DreamClassifier {
    /// `weights` must already be validated (`ModelWeights::validate`).
    pub fn new(weights: ModelWeights, sample_rate_hz: f64) -> Self {
        Self {
            weights,
            sample_rate_hz,
            min_active_bands: DEFAULT_MIN_ACTIVE_BANDS,
        }
    }

    pub fn with_min_active_bands(mut self, min_active_bands: usize) -> Self {
        self.min_active_bands = min_active_bands;
        self
    }

    pub fn model_version(&self) -> &str {
        &self.weights.version
    }

    pub fn classify(&self, bands: &BandPowerSet, stats: &SignalStats) -> AnalysisResult<Classification> {
        let active = bands.active_count();
        let required = self.min_active_bands.max(1);
        if active < required {
            return Err(AnalysisError::InsufficientFeatures { required, active });
        }

        let features = FeatureVector::build(bands, stats, self.sample_rate_hz);
        let probabilities = ProbabilityDistribution::from_normalized(self.softmax(&features));
        let (label, confidence) = probabilities.top();

        log::debug!(
            "Classified as {} ({:.2}%) with model {}",
            label,
            confidence * 100.0,
            self.weights.version
        );

        Ok(Classification {
            label,
            confidence,
            probabilities,
        })
    }

    /// Max-subtracted softmax over the per-label logits
    fn softmax(&self, features: &FeatureVector) -> [f64; LABEL_COUNT] {
        let mut logits = [0.0f64; LABEL_COUNT];
        for label in DreamLabel::ALL {
            let i = label.index();
            let dot: f64 = self.weights.weights[i]
                .iter()
                .zip(features.as_slice())
                .map(|(w, x)| w * x)
                .sum();
            logits[i] = (dot + self.weights.biases[i]) / self.weights.temperature;
        }

        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps = logits.map(|z| (z - max).exp());
        let total: f64 = exps.iter().sum();
        exps.map(|e| e / total)
    }
}

// ============================================================================
// TESTS
// ============================================================================
