//! Prediction Response
//!
//! The `/predict` wire record. Key names, flat nesting and the 0-100
//! confidence scale are consumed verbatim by every client view.

use serde::Serialize;

use crate::model::{Classification, DreamLabel, ProbabilityDistribution};
use crate::signal::SignalSeries;
use crate::spectral::BandPowerSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    pub dream: DreamLabel,
    /// Top probability as a percentage, two decimals
    pub confidence: f64,
    pub bands: BandPowerSet,
    /// 0-1 scale, sums to 1
    pub probabilities: ProbabilityDistribution,
    /// Waveform preview for plotting (index vs value)
    pub signal: Vec<f64>,
}

impl PredictionResponse {
    pub fn build(
        series: &SignalSeries,
        bands: BandPowerSet,
        classification: &Classification,
        preview_len: usize,
    ) -> Self {
        Self {
            dream: classification.label,
            confidence: classification.confidence_percent(),
            bands,
            probabilities: classification.probabilities.clone(),
            signal: series.downsample(preview_len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DreamClassifier;
    use crate::signal::SignalStats;

    #[test]
    fn test_wire_shape() {
        let series = SignalSeries::from_samples((0..300).map(|i| (i % 7) as f64).collect()).unwrap();
        let bands = BandPowerSet::new(0.1, 0.2, 0.5, 0.1);
        let classification = DreamClassifier::default()
            .classify(&bands, &SignalStats::compute(&series))
            .unwrap();

        let response = PredictionResponse::build(&series, bands, &classification, 200);
        let json = serde_json::to_value(&response).unwrap();
        let obj = json.as_object().unwrap();

        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["bands", "confidence", "dream", "probabilities", "signal"]);

        assert_eq!(obj["dream"], classification.label.as_str());
        assert_eq!(obj["signal"].as_array().unwrap().len(), 200);
        assert_eq!(obj["bands"].as_object().unwrap().len(), 4);
        assert_eq!(obj["probabilities"].as_object().unwrap().len(), 4);

        let confidence = obj["confidence"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&confidence));
        assert_eq!(confidence, (classification.confidence * 10_000.0).round() / 100.0);
    }
}
