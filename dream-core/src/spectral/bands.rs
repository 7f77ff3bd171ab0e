//! Band Power Extraction
//!
//! Integrates a Welch spectrum over delta / theta / alpha / beta and reports
//! each band relative to the total non-DC power.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::welch::{welch, Spectrum};
use crate::constants::{DEFAULT_MIN_SAMPLES, DEFAULT_SAMPLE_RATE_HZ, DEFAULT_SEGMENT_LEN, MIN_SEGMENT_LEN};
use crate::error::{AnalysisError, AnalysisResult, ConfigError};
use crate::signal::SignalSeries;

/// Total power below `peak² · FLAT_POWER_RATIO` is rounding noise from mean removal
const FLAT_POWER_RATIO: f64 = 1e-18;

// ============================================================================
// BANDS
// ============================================================================

/// Canonical EEG bands, declared in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Delta,
    Theta,
    Alpha,
    Beta,
}

impl Band {
    pub const ALL: [Band; 4] = [Band::Delta, Band::Theta, Band::Alpha, Band::Beta];

    pub fn as_str(&self) -> &'static str {
        match self {
            Band::Delta => "delta",
            Band::Theta => "theta",
            Band::Alpha => "alpha",
            Band::Beta => "beta",
        }
    }

    /// Frequency range in Hz. Upper edge is exclusive except for beta.
    pub fn range_hz(&self) -> (f64, f64) {
        match self {
            Band::Delta => (0.5, 4.0),
            Band::Theta => (4.0, 8.0),
            Band::Alpha => (8.0, 13.0),
            Band::Beta => (13.0, 30.0),
        }
    }

    fn inclusive_upper(&self) -> bool {
        matches!(self, Band::Beta)
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// BAND POWER SET
// ============================================================================

/// Closed band → power record, serialized as a flat four-key object.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BandPowerSet {
    pub delta: f64,
    pub theta: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl BandPowerSet {
    pub fn new(delta: f64, theta: f64, alpha: f64, beta: f64) -> Self {
        Self { delta, theta, alpha, beta }
    }

    /// Build from an open name → value map.
    ///
    /// All four bands must be present with finite, non-negative values.
    /// Unknown keys are ignored.
    pub fn from_map(map: &HashMap<String, f64>) -> AnalysisResult<Self> {
        let mut values = [0.0f64; 4];
        let mut present = 0usize;
        for (slot, band) in values.iter_mut().zip(Band::ALL) {
            if let Some(&v) = map.get(band.as_str()) {
                if v.is_finite() && v >= 0.0 {
                    *slot = v;
                    present += 1;
                }
            }
        }
        if present < Band::ALL.len() {
            return Err(AnalysisError::InsufficientFeatures {
                required: Band::ALL.len(),
                active: present,
            });
        }
        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }

    pub fn get(&self, band: Band) -> f64 {
        match band {
            Band::Delta => self.delta,
            Band::Theta => self.theta,
            Band::Alpha => self.alpha,
            Band::Beta => self.beta,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Band, f64)> + '_ {
        Band::ALL.into_iter().map(move |b| (b, self.get(b)))
    }

    /// Band with the largest value; ties go to the earlier band.
    pub fn dominant(&self) -> Band {
        let mut best = Band::Delta;
        for band in Band::ALL {
            if self.get(band) > self.get(best) {
                best = band;
            }
        }
        best
    }

    /// Bands carrying finite, strictly positive power.
    pub fn active_count(&self) -> usize {
        self.iter().filter(|(_, v)| v.is_finite() && *v > 0.0).count()
    }

    /// Values rescaled to sum to 1, in canonical order. All zero when there
    /// is no power at all.
    pub fn fractions(&self) -> [f64; 4] {
        let values = [self.delta, self.theta, self.alpha, self.beta];
        let total: f64 = values.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return [0.0; 4];
        }
        values.map(|v| v / total)
    }

    fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.delta * factor,
            self.theta * factor,
            self.alpha * factor,
            self.beta * factor,
        )
    }
}

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralConfig {
    pub sample_rate_hz: f64,
    /// Spectral estimate window; shorter signals are rejected
    pub min_samples: usize,
    pub segment_len: usize,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            min_samples: DEFAULT_MIN_SAMPLES,
            segment_len: DEFAULT_SEGMENT_LEN,
        }
    }
}

impl SpectralConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(ConfigError(format!(
                "sample rate must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        // beta must fit below Nyquist
        let (_, beta_hi) = Band::Beta.range_hz();
        if self.sample_rate_hz / 2.0 < beta_hi {
            return Err(ConfigError(format!(
                "sample rate {} Hz cannot resolve the beta band (needs >= {} Hz)",
                self.sample_rate_hz,
                beta_hi * 2.0
            )));
        }
        if self.min_samples < MIN_SEGMENT_LEN {
            return Err(ConfigError(format!(
                "min_samples must be at least {}, got {}",
                MIN_SEGMENT_LEN, self.min_samples
            )));
        }
        if self.segment_len < MIN_SEGMENT_LEN {
            return Err(ConfigError(format!(
                "segment_len must be at least {}, got {}",
                MIN_SEGMENT_LEN, self.segment_len
            )));
        }
        Ok(())
    }
}

// ============================================================================
// EXTRACTOR
// ============================================================================

/// Absolute and relative band powers plus the spectrum they came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandSpectrum {
    pub relative: BandPowerSet,
    /// Integrated PSD per band (signal units², e.g. µV²)
    pub absolute: BandPowerSet,
    pub total_power: f64,
    pub spectrum: Spectrum,
}

#[derive(Debug, Clone, Default)]
pub struct BandPowerExtractor {
    config: SpectralConfig,
}

impl BandPowerExtractor {
    pub fn new(config: SpectralConfig) -> Self {
        Self { config }
    }

    /// Relative band powers of `series`.
    pub fn extract(&self, series: &SignalSeries) -> AnalysisResult<BandPowerSet> {
        self.analyze(series).map(|b| b.relative)
    }

    pub fn analyze(&self, series: &SignalSeries) -> AnalysisResult<BandSpectrum> {
        if series.len() < self.config.min_samples {
            return Err(AnalysisError::InsufficientSamples {
                required: self.config.min_samples,
                actual: series.len(),
            });
        }

        let spectrum = welch(
            series.as_slice(),
            self.config.sample_rate_hz,
            self.config.segment_len,
        );

        let mut absolute = [0.0f64; 4];
        for (slot, band) in absolute.iter_mut().zip(Band::ALL) {
            let (lo, hi) = band.range_hz();
            *slot = spectrum.band_power(lo, hi, band.inclusive_upper());
        }
        let absolute = BandPowerSet::new(absolute[0], absolute[1], absolute[2], absolute[3]);

        let peak = series.as_slice().iter().fold(0.0f64, |m, v| m.max(v.abs()));
        let total_power = spectrum.total_power();
        let relative = if total_power.is_finite() && total_power > peak * peak * FLAT_POWER_RATIO {
            absolute.scaled(1.0 / total_power)
        } else {
            BandPowerSet::default()
        };

        log::debug!(
            "Band powers over {} samples ({} segments): delta={:.4} theta={:.4} alpha={:.4} beta={:.4}",
            series.len(),
            spectrum.segments,
            relative.delta,
            relative.theta,
            relative.alpha,
            relative.beta
        );

        Ok(BandSpectrum {
            relative,
            absolute,
            total_power,
            spectrum,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
