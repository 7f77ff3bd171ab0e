//! Analysis Errors
//!
//! Every pipeline stage reports failures through [`AnalysisError`].
//! Nothing is recovered silently: a stage that cannot produce a real
//! result fails instead of returning placeholder values.

use thiserror::Error;

/// Which side of the pipeline a failure belongs to.
///
/// `Input` means the upload itself is unusable; `Computation` means the
/// upload was readable but too short or too flat to analyse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Computation,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("No numeric samples could be read from the uploaded file")]
    EmptyOrUnparsableInput,

    #[error("Upload exceeds the {unit} limit ({actual} > {limit})")]
    FileTooLarge {
        limit: usize,
        actual: usize,
        unit: &'static str,
    },

    #[error("Sample {index} is not a finite number")]
    NonFiniteSample { index: usize },

    #[error("Signal too short for spectral analysis: {actual} samples, at least {required} required")]
    InsufficientSamples { required: usize, actual: usize },

    #[error("Not enough band activity to classify: {active} active bands, at least {required} required")]
    InsufficientFeatures { required: usize, active: usize },
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::EmptyOrUnparsableInput
            | AnalysisError::FileTooLarge { .. }
            | AnalysisError::NonFiniteSample { .. } => ErrorKind::Input,
            AnalysisError::InsufficientSamples { .. }
            | AnalysisError::InsufficientFeatures { .. } => ErrorKind::Computation,
        }
    }

    /// Stable machine-readable code, used as the `error` field on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::EmptyOrUnparsableInput => "empty_or_unparsable_input",
            AnalysisError::FileTooLarge { .. } => "file_too_large",
            AnalysisError::NonFiniteSample { .. } => "non_finite_sample",
            AnalysisError::InsufficientSamples { .. } => "insufficient_samples",
            AnalysisError::InsufficientFeatures { .. } => "insufficient_features",
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Rejected analysis settings (bad sample rate, undersized window, ...)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid analysis configuration: {0}")]
pub struct ConfigError(pub String);
