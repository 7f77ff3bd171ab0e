//! Signal Module - Upload parsing and time-domain statistics
//!
//! Turns raw upload bytes into a validated [`SignalSeries`] and summarises it.

pub mod ingest;
pub mod series;
pub mod stats;

pub use ingest::{IngestLimits, SignalIngest};
pub use series::SignalSeries;
pub use stats::{SignalQuality, SignalStats};
