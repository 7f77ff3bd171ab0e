//! Model Weights
//!
//! Softmax weights per label: one row of `FEATURE_COUNT` coefficients plus a
//! bias. Either the built-in set or a JSON weight file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::layout::{layout_hash, FEATURE_COUNT, FEATURE_VERSION};
use super::types::{DreamLabel, LABEL_COUNT};
use crate::constants::DEFAULT_MODEL_VERSION;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to read model file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed model file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model shape: {0}")]
    Shape(String),

    #[error("Feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), got v{actual_version} (hash: {actual_hash:08x})")]
    LayoutMismatch {
        expected_version: u8,
        expected_hash: u32,
        actual_version: u8,
        actual_hash: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelWeights {
    pub version: String,
    pub layout_version: u8,
    pub layout_hash: u32,
    /// Softmax temperature; below 1 sharpens, above 1 flattens
    pub temperature: f64,
    /// Row order of `weights` / `biases`
    pub labels: Vec<DreamLabel>,
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
}

impl ModelWeights {
    /// Hand-tuned weights: each label keys on its characteristic band.
    ///
    /// delta → Normal Sleep, theta → Memory Recall, alpha → Lucid Dream,
    /// beta (and fast mean frequency) → Nightmare.
    pub fn builtin(version: &str) -> Self {
        Self {
            version: version.to_string(),
            layout_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            temperature: 0.5,
            labels: DreamLabel::ALL.to_vec(),
            //            delta theta alpha beta  mobility
            weights: vec![
                vec![0.0, 0.5, 4.0, 1.0, 0.5],  // Lucid Dream
                vec![0.0, 0.0, 0.5, 4.0, 1.5],  // Nightmare
                vec![0.5, 4.0, 0.5, 0.0, 0.0],  // Memory Recall
                vec![4.0, 0.5, 0.0, 0.0, -1.0], // Normal Sleep
            ],
            biases: vec![0.0, -0.3, 0.0, 0.2],
        }
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        log::info!("Loading model weights from: {}", path.display());

        let text = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let weights = Self::from_json(&text)?;

        log::info!("Model '{}' loaded successfully", weights.version);
        Ok(weights)
    }

    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        let weights: Self = serde_json::from_str(text)?;
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.layout_version != FEATURE_VERSION || self.layout_hash != layout_hash() {
            return Err(ModelError::LayoutMismatch {
                expected_version: FEATURE_VERSION,
                expected_hash: layout_hash(),
                actual_version: self.layout_version,
                actual_hash: self.layout_hash,
            });
        }
        if self.labels != DreamLabel::ALL {
            return Err(ModelError::Shape(format!(
                "labels must be {:?} in that order",
                DreamLabel::ALL.map(|l| l.as_str())
            )));
        }
        if self.weights.len() != LABEL_COUNT || self.biases.len() != LABEL_COUNT {
            return Err(ModelError::Shape(format!(
                "expected {} weight rows and biases, got {} and {}",
                LABEL_COUNT,
                self.weights.len(),
                self.biases.len()
            )));
        }
        if let Some(row) = self.weights.iter().position(|r| r.len() != FEATURE_COUNT) {
            return Err(ModelError::Shape(format!(
                "weight row {} has {} coefficients, expected {}",
                row,
                self.weights[row].len(),
                FEATURE_COUNT
            )));
        }
        let all_finite = self
            .weights
            .iter()
            .flatten()
            .chain(&self.biases)
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(ModelError::Shape("weights and biases must be finite".to_string()));
        }
        if !self.temperature.is_finite() || self.temperature <= 0.0 {
            return Err(ModelError::Shape(format!(
                "temperature must be positive, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

impl Default for ModelWeights {
    fn default() -> Self {
        Self::builtin(DEFAULT_MODEL_VERSION)
    }
}
