use crate::assembly::{merge_cell, simple::assemble_simple};
use crate::core::model::{Cell, Detection};
use crate::core::strategy::MIN_BOUNDARIES;

/// Groups detections into horizontal bands delimited by `bounds`.
///
/// Besides every `[top, bottom)` pair there is a head band above the first
/// boundary and a tail band from the last boundary down. Each non-empty band
/// becomes one cell. With fewer than two boundaries there is no usable grid
/// and the result is exactly simple-mode output.
pub fn assemble_banded(detections: &[Detection], bounds: &[i32]) -> Vec<Vec<Cell>> {
    if bounds.len() < MIN_BOUNDARIES {
        return assemble_simple(detections);
    }

    let mut edges: Vec<f32> = Vec::with_capacity(bounds.len() + 2);
    edges.push(f32::NEG_INFINITY);
    edges.extend(bounds.iter().map(|&b| b as f32));
    edges.push(f32::INFINITY);

    let mut rows = Vec::new();
    let mut empty_bands = 0usize;
    for band in edges.windows(2) {
        let (top, bottom) = (band[0], band[1]);
        let members: Vec<&Detection> = detections
            .iter()
            .filter(|d| {
                let mid = d.mid_y();
                mid >= top && mid < bottom
            })
            .collect();
        match merge_cell(members) {
            Some(cell) => rows.push(vec![cell]),
            None => empty_bands += 1,
        }
    }
    tracing::debug!(
        bands = edges.len() - 1,
        empty_bands,
        "banded assembly produced {} rows",
        rows.len()
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::tests::det;
    use pretty_assertions::assert_eq;

    #[test]
    fn multi_line_descriptions_merge_per_band() {
        let dets = vec![
            det("STEEL", 0.0, 110.0, 120.0, 0.96),
            det("BRACKET", 0.0, 125.0, 135.0, 0.90),
            det("SHEET", 60.0, 110.0, 120.0, 0.99),
            det("BOLT", 0.0, 210.0, 220.0, 0.98),
        ];
        let rows = assemble_banded(&dets, &[100, 200, 300]);
        assert_eq!(
            rows,
            vec![
                vec![Cell::ocr("STEEL SHEET BRACKET", 0.90)],
                vec![Cell::ocr("BOLT", 0.98)],
            ]
        );
    }

    #[test]
    fn head_and_tail_bands_are_kept() {
        let dets = vec![
            det("HEADER", 0.0, 10.0, 20.0, 0.99),
            det("ROW", 0.0, 150.0, 160.0, 0.9),
            det("FOOTER", 0.0, 400.0, 410.0, 0.8),
        ];
        let rows = assemble_banded(&dets, &[100, 200]);
        let texts: Vec<&str> = rows.iter().map(|r| r[0].text.as_str()).collect();
        assert_eq!(texts, vec!["HEADER", "ROW", "FOOTER"]);
    }

    #[test]
    fn band_confidence_is_minimum_and_empty_bands_drop() {
        let dets = vec![
            det("A", 0.0, 120.0, 130.0, 0.99),
            det("B", 20.0, 120.0, 130.0, 0.42),
            det("C", 40.0, 120.0, 130.0, 0.87),
        ];
        let rows = assemble_banded(&dets, &[0, 100, 200, 300, 400]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0].confidence, 0.42);
    }

    #[test]
    fn single_boundary_equals_simple_mode() {
        let dets = vec![
            det("ACME-01", 0.0, 40.0, 50.0, 0.9),
            det("100", 0.0, 10.0, 20.0, 0.97),
            det("X", 0.0, 90.0, 99.0, 0.5),
        ];
        assert_eq!(assemble_banded(&dets, &[45]), assemble_simple(&dets));
        assert_eq!(assemble_banded(&dets, &[]), assemble_simple(&dets));
    }
}
