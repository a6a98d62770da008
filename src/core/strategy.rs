use serde::{Deserialize, Serialize};

/// Minimum number of clustered boundaries for banded assembly to be usable.
pub const MIN_BOUNDARIES: usize = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Simple,
    Banded,
    Rectangle,
}

/// What the grid probe found for one image.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridSignals {
    pub row_boundaries: usize,
    pub rectangles: usize,
    /// Column is known to hold one short value per visual line.
    pub line_per_row: bool,
    /// Caller asked for full row x column cells.
    pub rectangle_mode: bool,
}

pub fn select_strategy(signals: GridSignals) -> StrategyKind {
    if signals.rectangle_mode && signals.rectangles > 0 {
        StrategyKind::Rectangle
    } else if signals.line_per_row || signals.rectangle_mode {
        StrategyKind::Simple
    } else if signals.row_boundaries >= MIN_BOUNDARIES {
        StrategyKind::Banded
    } else {
        StrategyKind::Simple
    }
}
