//! Signal Series
//!
//! Ordered, finite, non-empty sequence of microvolt readings.

use serde::Serialize;

use crate::error::{AnalysisError, AnalysisResult};

/// A validated time series.
///
/// Invariants: at least one sample, every sample finite. The inner buffer is
/// never exposed mutably, so a series is immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SignalSeries {
    samples: Vec<f64>,
}

impl SignalSeries {
    /// Build a series from already-decoded samples (e.g. a JSON body).
    pub fn from_samples(samples: Vec<f64>) -> AnalysisResult<Self> {
        if samples.is_empty() {
            return Err(AnalysisError::EmptyOrUnparsableInput);
        }
        if let Some(index) = samples.iter().position(|v| !v.is_finite()) {
            return Err(AnalysisError::NonFiniteSample { index });
        }
        Ok(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed series; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    /// Evenly strided subsample of at most `max_points` values.
    ///
    /// Returns the full series when it already fits. Otherwise the first and
    /// last samples are always kept and the rest are picked at equal spacing.
    pub fn downsample(&self, max_points: usize) -> Vec<f64> {
        let n = self.samples.len();
        if max_points == 0 {
            return Vec::new();
        }
        if n <= max_points {
            return self.samples.clone();
        }
        if max_points == 1 {
            return vec![self.samples[0]];
        }

        let step = (n - 1) as f64 / (max_points - 1) as f64;
        (0..max_points)
            .map(|i| {
                let idx = ((i as f64 * step).round() as usize).min(n - 1);
                self.samples[idx]
            })
            .collect()
    }
}
