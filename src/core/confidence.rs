use serde::{Deserialize, Serialize};

use crate::core::model::{Cell, CellOrigin};

pub const TRUSTED_THRESHOLD: f32 = 0.95;
pub const CAUTION_THRESHOLD: f32 = 0.80;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBucket {
    Trusted,
    Caution,
    Low,
    /// Manually entered or empty; nothing to grade.
    Unscored,
}

pub fn bucket(confidence: f32) -> ConfidenceBucket {
    if confidence >= TRUSTED_THRESHOLD {
        ConfidenceBucket::Trusted
    } else if confidence >= CAUTION_THRESHOLD {
        ConfidenceBucket::Caution
    } else {
        ConfidenceBucket::Low
    }
}

pub fn cell_bucket(cell: &Cell) -> ConfidenceBucket {
    if cell.origin == CellOrigin::Manual || cell.is_empty() {
        ConfidenceBucket::Unscored
    } else {
        bucket(cell.confidence)
    }
}

/// Pessimistic aggregate: one weak fragment downgrades the whole cell.
pub fn min_confidence(values: impl IntoIterator<Item = f32>) -> Option<f32> {
    values.into_iter().fold(None, |acc, v| match acc {
        Some(m) if m <= v => Some(m),
        _ => Some(v),
    })
}
