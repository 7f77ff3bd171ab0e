//! Feature Layout - Classifier input schema
//!
//! ## Rules:
//! 1. Add, remove or reorder a feature → increment FEATURE_VERSION
//! 2. Weight files record the layout hash they were trained against

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::signal::SignalStats;
use crate::spectral::BandPowerSet;

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

/// Feature names in vector order
pub const FEATURE_LAYOUT: &[&str] = &[
    "delta_fraction", // 0: delta share of summed band power
    "theta_fraction", // 1
    "alpha_fraction", // 2
    "beta_fraction",  // 3
    "mobility",       // 4: Hjorth mean frequency / MOBILITY_CEILING_HZ, clamped to 0..1
];

pub const FEATURE_COUNT: usize = 5;

/// Mean frequency mapped to a mobility feature of 1.0
pub const MOBILITY_CEILING_HZ: f64 = 30.0;

/// CRC32 over version + names; weight files must carry the same value.
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);
    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn build(bands: &BandPowerSet, stats: &SignalStats, sample_rate_hz: f64) -> Self {
        let [delta, theta, alpha, beta] = bands.fractions();
        let mobility = (stats.mean_frequency_hz(sample_rate_hz) / MOBILITY_CEILING_HZ).clamp(0.0, 1.0);
        Self {
            values: [delta, theta, alpha, beta, mobility],
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}
