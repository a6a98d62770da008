pub mod banded;
pub mod bands;
pub mod rectangle;
pub mod simple;

use crate::core::confidence::min_confidence;
use crate::core::geometry::BBox;
use crate::core::model::{Cell, Detection, RowBounds};
use crate::core::strategy::{select_strategy, GridSignals, StrategyKind};

pub use banded::assemble_banded;
pub use bands::{band_tolerance, cluster_boundaries};
pub use rectangle::assemble_rectangles;
pub use simple::assemble_simple;

/// A selected assembly mode together with the grid evidence it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyStrategy {
    Simple,
    Banded(RowBounds),
    Rectangle(Vec<BBox>),
}

impl AssemblyStrategy {
    /// Picks a mode from what the grid probe found.
    pub fn probe(
        bounds: RowBounds,
        rectangles: Vec<BBox>,
        line_per_row: bool,
        rectangle_mode: bool,
    ) -> Self {
        let signals = GridSignals {
            row_boundaries: bounds.len(),
            rectangles: rectangles.len(),
            line_per_row,
            rectangle_mode,
        };
        match select_strategy(signals) {
            StrategyKind::Simple => AssemblyStrategy::Simple,
            StrategyKind::Banded => AssemblyStrategy::Banded(bounds),
            StrategyKind::Rectangle => AssemblyStrategy::Rectangle(rectangles),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            AssemblyStrategy::Simple => StrategyKind::Simple,
            AssemblyStrategy::Banded(_) => StrategyKind::Banded,
            AssemblyStrategy::Rectangle(_) => StrategyKind::Rectangle,
        }
    }

    pub fn assemble(&self, detections: &[Detection]) -> Vec<Vec<Cell>> {
        let rows = match self {
            AssemblyStrategy::Simple => assemble_simple(detections),
            AssemblyStrategy::Banded(bounds) => assemble_banded(detections, bounds),
            AssemblyStrategy::Rectangle(rects) => assemble_rectangles(detections, rects),
        };
        tracing::debug!(
            strategy = ?self.kind(),
            detections = detections.len(),
            "assembled {} rows",
            rows.len()
        );
        rows
    }
}

/// Joins fragments in reading order (top edge, then left edge) into one cell
/// carrying the weakest member confidence. `None` when there are no members.
pub(crate) fn merge_cell(mut members: Vec<&Detection>) -> Option<Cell> {
    if members.is_empty() {
        return None;
    }
    members.sort_by(|a, b| {
        let (ba, bb) = (a.bbox(), b.bbox());
        ba.y0.total_cmp(&bb.y0).then(ba.x0.total_cmp(&bb.x0))
    });
    let text = members
        .iter()
        .map(|d| d.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let confidence = min_confidence(members.iter().map(|d| d.confidence)).unwrap_or(0.0);
    Some(Cell::ocr(text, confidence))
}
