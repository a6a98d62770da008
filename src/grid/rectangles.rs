use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};

use crate::core::geometry::BBox;

#[derive(Debug, Clone, Copy)]
pub struct CellSizeFloor {
    pub min_width: u32,
    pub min_height: u32,
}

/// Cell interiors of a ruled grid mask, in working-image pixels.
///
/// Each enclosed background region of the mask is bounded by a hole border;
/// the bounding box of that border is the cell. Boxes narrower or shorter than
/// `floor` are noise (text counters, stroke artefacts) and are dropped.
pub fn hole_rectangles(grid_mask: &GrayImage, floor: CellSizeFloor) -> Vec<BBox> {
    let contours = find_contours::<u32>(grid_mask);
    let mut rects = Vec::new();
    for contour in contours
        .iter()
        .filter(|c| c.border_type == BorderType::Hole && !c.points.is_empty())
    {
        let (mut x0, mut y0, mut x1, mut y1) = (u32::MAX, u32::MAX, 0u32, 0u32);
        for p in &contour.points {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        let (w, h) = (x1 - x0 + 1, y1 - y0 + 1);
        if w < floor.min_width || h < floor.min_height {
            continue;
        }
        rects.push(BBox::new(x0 as f32, y0 as f32, (x1 + 1) as f32, (y1 + 1) as f32));
    }
    rects
}
