//! Spectral Module - Band power extraction
//!
//! Welch power spectral density integrated over the four canonical EEG bands.
//!
//! ```text
//! SignalSeries ──► welch() ──► Spectrum ──► BandPowerExtractor ──► BandPowerSet
//! ```

pub mod bands;
pub mod welch;

pub use bands::{Band, BandPowerExtractor, BandPowerSet, BandSpectrum, SpectralConfig};
pub use welch::{welch, Spectrum};
