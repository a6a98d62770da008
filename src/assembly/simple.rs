use crate::core::model::{Cell, Detection};

/// One row per detection, ordered by vertical midpoint. Ties keep input order.
pub fn assemble_simple(detections: &[Detection]) -> Vec<Vec<Cell>> {
    let mut ordered: Vec<&Detection> = detections.iter().collect();
    ordered.sort_by(|a, b| a.mid_y().total_cmp(&b.mid_y()));
    ordered
        .into_iter()
        .map(|det| vec![Cell::ocr(det.text.clone(), det.confidence)])
        .collect()
}
