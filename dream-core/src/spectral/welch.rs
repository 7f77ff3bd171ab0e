//! Welch PSD estimate
//!
//! Hann-windowed segments with 50% overlap, per-segment mean removal and
//! one-sided density scaling (units²/Hz).

use rustfft::{num_complex::Complex, FftPlanner};
use serde::Serialize;

/// One-sided power spectral density
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spectrum {
    pub frequencies: Vec<f64>,
    pub psd: Vec<f64>,
    pub resolution_hz: f64,
    pub segments: usize,
}

impl Spectrum {
    /// Integrated power over bins with `lo <= f < hi` (or `<= hi` when inclusive).
    pub fn band_power(&self, lo: f64, hi: f64, inclusive_hi: bool) -> f64 {
        self.frequencies
            .iter()
            .zip(&self.psd)
            .filter(|(&f, _)| f >= lo && (f < hi || (inclusive_hi && f <= hi)))
            .map(|(_, &p)| p * self.resolution_hz)
            .sum()
    }

    /// Integrated power over every bin except DC.
    pub fn total_power(&self) -> f64 {
        self.psd.iter().skip(1).map(|p| p * self.resolution_hz).sum()
    }
}

/// Periodic Hann window
fn hann(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 0.5 - 0.5 * (std::f64::consts::TAU * i as f64 / len as f64).cos())
        .collect()
}

/// Welch estimate with `min(segment_len, x.len())` samples per segment.
///
/// Callers guarantee `x.len() >= 2`; the band extractor enforces a much
/// larger floor before getting here.
pub fn welch(x: &[f64], sample_rate_hz: f64, segment_len: usize) -> Spectrum {
    let nperseg = segment_len.min(x.len()).max(2);
    let hop = (nperseg / 2).max(1);
    let n_bins = nperseg / 2 + 1;

    let window = hann(nperseg);
    let window_power: f64 = window.iter().map(|w| w * w).sum();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(nperseg);

    let mut accumulated = vec![0.0f64; n_bins];
    let mut buffer = vec![Complex::new(0.0, 0.0); nperseg];
    let mut segments = 0usize;
    let mut start = 0usize;

    while start + nperseg <= x.len() {
        let segment = &x[start..start + nperseg];
        let mean = segment.iter().sum::<f64>() / nperseg as f64;

        for ((slot, &v), &w) in buffer.iter_mut().zip(segment).zip(&window) {
            *slot = Complex::new((v - mean) * w, 0.0);
        }
        fft.process(&mut buffer);

        for (acc, c) in accumulated.iter_mut().zip(&buffer) {
            *acc += c.norm_sqr();
        }

        segments += 1;
        start += hop;
    }

    let scale = 1.0 / (sample_rate_hz * window_power * segments.max(1) as f64);
    let nyquist_bin = if nperseg % 2 == 0 { Some(nperseg / 2) } else { None };

    let psd = accumulated
        .iter()
        .enumerate()
        .map(|(k, &p)| {
            let one_sided = if k == 0 || Some(k) == nyquist_bin { 1.0 } else { 2.0 };
            p * scale * one_sided
        })
        .collect();

    let resolution_hz = sample_rate_hz / nperseg as f64;
    let frequencies = (0..n_bins).map(|k| k as f64 * resolution_hz).collect();

    Spectrum {
        frequencies,
        psd,
        resolution_hz,
        segments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, fs: f64, n: usize, amplitude: f64) -> Vec<f64> {
        (0..n)
            .map(|i| amplitude * (std::f64::consts::TAU * freq * i as f64 / fs).sin())
            .collect()
    }

    #[test]
    fn test_segment_layout() {
        let spectrum = welch(&sine(10.0, 250.0, 500, 1.0), 250.0, 256);
        // starts at 0 and 128; 256 + 256 > 500
        assert_eq!(spectrum.segments, 2);
        assert_eq!(spectrum.psd.len(), 129);
        assert!((spectrum.resolution_hz - 250.0 / 256.0).abs() < 1e-12);
    }

    #[test]
    fn test_short_signal_uses_single_segment() {
        let spectrum = welch(&sine(10.0, 250.0, 150, 1.0), 250.0, 256);
        assert_eq!(spectrum.segments, 1);
        assert_eq!(spectrum.psd.len(), 76);
    }

    #[test]
    fn test_peak_lands_on_tone() {
        let spectrum = welch(&sine(20.0, 250.0, 1024, 1.0), 250.0, 256);
        let (peak_bin, _) = spectrum
            .psd
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();
        let peak_hz = spectrum.frequencies[peak_bin];
        assert!((peak_hz - 20.0).abs() <= spectrum.resolution_hz);
    }

    #[test]
    fn test_total_power_matches_variance() {
        // Parseval: integrated one-sided density ≈ signal variance (A²/2)
        let spectrum = welch(&sine(25.0, 250.0, 2048, 2.0), 250.0, 256);
        let total = spectrum.total_power();
        assert!((total - 2.0).abs() < 0.1, "total power {total}");
    }

    #[test]
    fn test_dc_offset_is_removed() {
        let shifted: Vec<f64> = sine(10.0, 250.0, 512, 1.0).iter().map(|v| v + 100.0).collect();
        let spectrum = welch(&shifted, 250.0, 256);
        assert!(spectrum.psd[0] < 1e-2, "DC bin {}", spectrum.psd[0]);
    }
}
