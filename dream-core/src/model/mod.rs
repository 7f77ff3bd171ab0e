//! Model Module - Dream classification
//!
//! Feature layout, model weights and the classifier are kept apart so a
//! retrained weight file can be swapped in without touching the pipeline.

pub mod classifier;
pub mod layout;
pub mod types;
pub mod weights;

pub use classifier::DreamClassifier;
pub use layout::{FeatureVector, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use types::{Classification, DreamLabel, ProbabilityDistribution, LABEL_COUNT};
pub use weights::{ModelError, ModelWeights};
