use crate::assembly::{merge_cell, simple::assemble_simple};
use crate::core::geometry::BBox;
use crate::core::model::{Cell, Detection};

/// Orders cell rectangles into rows, top to bottom, each row left to right.
///
/// A rectangle starts a new row when its top edge sits at least half the
/// current row's first-cell height below that cell's top edge.
pub fn grid_rows(rectangles: &[BBox]) -> Vec<Vec<BBox>> {
    let mut sorted = rectangles.to_vec();
    sorted.sort_by(|a, b| a.y0.total_cmp(&b.y0).then(a.x0.total_cmp(&b.x0)));

    let mut rows: Vec<Vec<BBox>> = Vec::new();
    for rect in sorted {
        match rows.last_mut() {
            Some(row) if rect.y0 - row[0].y0 < row[0].height() * 0.5 => row.push(rect),
            _ => rows.push(vec![rect]),
        }
    }
    for row in &mut rows {
        row.sort_by(|a, b| a.x0.total_cmp(&b.x0));
    }
    rows
}

/// Places every detection in the first rectangle containing its midpoint.
///
/// Rectangles with no detections become empty cells so columns stay aligned.
/// Without rectangles this is simple mode over the whole image.
pub fn assemble_rectangles(detections: &[Detection], rectangles: &[BBox]) -> Vec<Vec<Cell>> {
    if rectangles.is_empty() {
        return assemble_simple(detections);
    }

    let rows = grid_rows(rectangles);
    let ordered: Vec<BBox> = rows.iter().flatten().copied().collect();
    let mut members: Vec<Vec<&Detection>> = vec![Vec::new(); ordered.len()];

    let mut unassigned = 0usize;
    for det in detections {
        let (cx, _) = det.bbox().center();
        match ordered.iter().position(|r| r.contains(cx, det.mid_y())) {
            Some(idx) => members[idx].push(det),
            None => {
                unassigned += 1;
                tracing::debug!("detection {:?} lies outside every grid cell", det.text);
            }
        }
    }
    if unassigned > 0 {
        tracing::debug!("{unassigned} detections fell outside the grid");
    }

    let mut cells = members.into_iter().map(|m| merge_cell(m).unwrap_or_else(Cell::empty));
    rows.iter()
        .map(|row| cells.by_ref().take(row.len()).collect::<Vec<Cell>>())
        .collect()
}
