//! Time-domain summary statistics

use serde::{Deserialize, Serialize};

use super::series::SignalSeries;

/// Standard deviation above which a recording is graded `good`
const GOOD_STD: f64 = 0.1;

/// Standard deviation above which a recording is graded `fair`
const FAIR_STD: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalQuality {
    Good,
    Fair,
    Poor,
}

impl SignalQuality {
    pub fn from_std(std: f64) -> Self {
        if std > GOOD_STD {
            SignalQuality::Good
        } else if std > FAIR_STD {
            SignalQuality::Fair
        } else {
            SignalQuality::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalQuality::Good => "good",
            SignalQuality::Fair => "fair",
            SignalQuality::Poor => "poor",
        }
    }
}

/// Summary of a series. `std` is the population standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    /// Hjorth mobility, radians per sample (0 for flat or 1-sample signals)
    pub mobility: f64,
}

impl SignalStats {
    pub fn compute(series: &SignalSeries) -> Self {
        let x = series.as_slice();
        let n = x.len() as f64;

        let mean = x.iter().sum::<f64>() / n;
        let variance = x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let min = x.iter().copied().fold(f64::INFINITY, f64::min);
        let max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            mean,
            std: variance.sqrt(),
            min,
            max,
            median: median(x),
            mobility: hjorth_mobility(x, variance),
        }
    }

    /// Mean frequency implied by the Hjorth mobility.
    pub fn mean_frequency_hz(&self, sample_rate_hz: f64) -> f64 {
        self.mobility * sample_rate_hz / std::f64::consts::TAU
    }

    pub fn quality(&self) -> SignalQuality {
        SignalQuality::from_std(self.std)
    }
}

fn median(x: &[f64]) -> f64 {
    let mut sorted = x.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn hjorth_mobility(x: &[f64], variance: f64) -> f64 {
    if x.len() < 2 || variance <= f64::EPSILON {
        return 0.0;
    }
    let diffs: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let d_mean = diffs.iter().sum::<f64>() / diffs.len() as f64;
    let d_var = diffs.iter().map(|d| (d - d_mean).powi(2)).sum::<f64>() / diffs.len() as f64;
    (d_var / variance).sqrt()
}
