//! Classification Types
//!
//! Data structures only - scoring lives in `classifier.rs`.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

// ============================================================================
// DREAM LABELS
// ============================================================================

pub const LABEL_COUNT: usize = 4;

/// Closed set of dream classes, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DreamLabel {
    #[serde(rename = "Lucid Dream")]
    LucidDream,
    #[serde(rename = "Nightmare")]
    Nightmare,
    #[serde(rename = "Memory Recall")]
    MemoryRecall,
    #[serde(rename = "Normal Sleep")]
    NormalSleep,
}

impl DreamLabel {
    pub const ALL: [DreamLabel; LABEL_COUNT] = [
        DreamLabel::LucidDream,
        DreamLabel::Nightmare,
        DreamLabel::MemoryRecall,
        DreamLabel::NormalSleep,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DreamLabel::LucidDream => "Lucid Dream",
            DreamLabel::Nightmare => "Nightmare",
            DreamLabel::MemoryRecall => "Memory Recall",
            DreamLabel::NormalSleep => "Normal Sleep",
        }
    }

    pub fn from_name(name: &str) -> Option<DreamLabel> {
        DreamLabel::ALL.into_iter().find(|l| l.as_str() == name)
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for DreamLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// PROBABILITY DISTRIBUTION
// ============================================================================

/// One probability per label, summing to 1.
///
/// Serialized as a flat `label → probability` object on the 0-1 scale.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityDistribution {
    probs: [f64; LABEL_COUNT],
}

impl ProbabilityDistribution {
    /// Caller guarantees the values are a normalized distribution.
    pub(crate) fn from_normalized(probs: [f64; LABEL_COUNT]) -> Self {
        Self { probs }
    }

    pub fn get(&self, label: DreamLabel) -> f64 {
        self.probs[label.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (DreamLabel, f64)> + '_ {
        DreamLabel::ALL.into_iter().map(move |l| (l, self.get(l)))
    }

    pub fn sum(&self) -> f64 {
        self.probs.iter().sum()
    }

    /// Arg-max; ties go to the earlier label.
    pub fn top(&self) -> (DreamLabel, f64) {
        let mut best = DreamLabel::ALL[0];
        for label in DreamLabel::ALL {
            if self.get(label) > self.get(best) {
                best = label;
            }
        }
        (best, self.get(best))
    }
}

impl Serialize for ProbabilityDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.probs.len()))?;
        for (label, p) in self.iter() {
            map.serialize_entry(label.as_str(), &p)?;
        }
        map.end()
    }
}

// ============================================================================
// CLASSIFICATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub label: DreamLabel,
    /// Maximum entry of `probabilities` (0.0 - 1.0)
    pub confidence: f64,
    pub probabilities: ProbabilityDistribution,
}

impl Classification {
    /// Confidence as a percentage rounded to two decimals.
    pub fn confidence_percent(&self) -> f64 {
        (self.confidence * 10_000.0).round() / 100.0
    }
}
