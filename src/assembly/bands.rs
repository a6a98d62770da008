use crate::core::model::{Detection, RowBounds};

/// Merge tolerance for rule clustering: the median detection height, never
/// below `floor`.
pub fn band_tolerance(detections: &[Detection], floor: f32) -> f32 {
    let mut heights: Vec<f32> = detections
        .iter()
        .map(|d| d.bbox().height())
        .filter(|h| h.is_finite())
        .collect();
    if heights.is_empty() {
        return floor;
    }
    heights.sort_by(f32::total_cmp);
    let mid = heights.len() / 2;
    let median = if heights.len() % 2 == 0 {
        (heights[mid - 1] + heights[mid]) * 0.5
    } else {
        heights[mid]
    };
    median.max(floor)
}

/// Collapses rule positions into ascending row boundaries.
///
/// Values join the open cluster while they lie within `tolerance` of its first
/// member; each cluster contributes its rounded mean.
pub fn cluster_boundaries(ys: &[f32], tolerance: f32) -> RowBounds {
    let mut sorted: Vec<f32> = ys.iter().copied().filter(|y| y.is_finite()).collect();
    sorted.sort_by(f32::total_cmp);

    let mut bounds = RowBounds::new();
    let mut cluster: Vec<f32> = Vec::new();
    let flush = |cluster: &mut Vec<f32>, bounds: &mut RowBounds| {
        if cluster.is_empty() {
            return;
        }
        let mean = cluster.iter().sum::<f32>() / cluster.len() as f32;
        let bound = mean.round() as i32;
        if bounds.last() != Some(&bound) {
            bounds.push(bound);
        }
        cluster.clear();
    };

    for y in sorted {
        match cluster.first() {
            Some(&first) if y - first < tolerance => cluster.push(y),
            Some(_) => {
                flush(&mut cluster, &mut bounds);
                cluster.push(y);
            }
            None => cluster.push(y),
        }
    }
    flush(&mut cluster, &mut bounds);

    tracing::debug!(
        lines = ys.len(),
        tolerance,
        "clustered into {} row boundaries",
        bounds.len()
    );
    bounds
}
