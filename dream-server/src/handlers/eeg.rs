//! Raw signal analysis handler
//!
//! Band breakdown and statistics for a signal posted as JSON. No
//! classification, so it works even when the model is unavailable.

use axum::{extract::State, Json};
use dream_core::{BandPowerExtractor, SignalDescription, SignalSeries, SpectralConfig};
use serde::Deserialize;
use validator::Validate;

use crate::extract::JsonBody;
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct EegAnalyzeRequest {
    #[validate(length(min = 1))]
    pub signal: Vec<f64>,

    #[validate(range(min = 60.0, max = 10000.0))]
    pub sampling_rate: Option<f64>,
}

pub async fn analyze(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<EegAnalyzeRequest>,
) -> AppResult<Json<SignalDescription>> {
    req.validate()?;

    if req.signal.len() > state.config.max_samples {
        return Err(AppError::PayloadTooLarge(format!(
            "Signal has {} samples, limit is {}",
            req.signal.len(),
            state.config.max_samples
        )));
    }

    let spectral = SpectralConfig {
        sample_rate_hz: req.sampling_rate.unwrap_or(state.config.sample_rate_hz),
        ..state.config.spectral_config()
    };
    spectral
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let extractor = BandPowerExtractor::new(spectral);
    let description = state
        .analysis
        .run(move || {
            let series = SignalSeries::from_samples(req.signal)?;
            dream_core::describe(&extractor, &series)
        })
        .await?;

    Ok(Json(description))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(sampling_rate: Option<f64>) -> EegAnalyzeRequest {
        EegAnalyzeRequest {
            signal: vec![0.0; 16],
            sampling_rate,
        }
    }

    #[test]
    fn test_sampling_rate_bounds_match_spectral_config() {
        assert!(request(Some(59.9)).validate().is_err());
        assert!(request(Some(60.0)).validate().is_ok());
        assert!(request(None).validate().is_ok());

        let lowest = SpectralConfig {
            sample_rate_hz: 60.0,
            ..SpectralConfig::default()
        };
        assert!(lowest.validate().is_ok());
    }
}
