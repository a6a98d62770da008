pub mod morphology;
pub mod rectangles;
pub mod segments;

use crate::config::GridConfig;
use crate::core::geometry::BBox;
use crate::ocr::image_source::SourceImage;

use morphology::Direction;
use rectangles::CellSizeFloor;
use segments::SegmentParams;

/// Structural line evidence for one image. Purely geometric.
pub trait GridProbe {
    /// y-coordinates (detection space) of horizontal rules. Empty when the
    /// image has no visible rules.
    fn horizontal_lines(&self, image: &SourceImage) -> Vec<f32>;

    /// Cell rectangles (detection space) of a ruled grid, unordered.
    fn cell_rectangles(&self, image: &SourceImage) -> Vec<BBox>;
}

#[derive(Debug, Clone, Default)]
pub struct MorphologyGridDetector {
    config: GridConfig,
}

impl MorphologyGridDetector {
    pub fn new(config: GridConfig) -> Self {
        Self { config }
    }

    fn stroke_mask(&self, image: &SourceImage, direction: Direction) -> image::GrayImage {
        let binary = morphology::binarize_inverted(&image.gray, self.config.binarize_threshold);
        let extent = match direction {
            Direction::Horizontal => image.width(),
            Direction::Vertical => image.height(),
        };
        let len = morphology::kernel_len(extent, self.config.kernel_divisor, self.config.min_kernel);
        morphology::open_lines(&binary, direction, len)
    }
}

impl GridProbe for MorphologyGridDetector {
    fn horizontal_lines(&self, image: &SourceImage) -> Vec<f32> {
        let mask = self.stroke_mask(image, Direction::Horizontal);
        let params = SegmentParams {
            min_length: image.width() / self.config.min_line_divisor.max(1),
            max_gap: self.config.max_line_gap,
            vote_threshold: self.config.vote_threshold,
        };
        let segments = segments::scan_horizontal(&mask, params);

        let mut ys: Vec<u32> = segments.iter().map(|s| s.y).collect();
        ys.sort_unstable();
        ys.dedup();
        tracing::debug!(
            segments = segments.len(),
            "found {} horizontal rule rows",
            ys.len()
        );
        ys.into_iter().map(|y| image.to_source(y as f32)).collect()
    }

    fn cell_rectangles(&self, image: &SourceImage) -> Vec<BBox> {
        let horizontal = self.stroke_mask(image, Direction::Horizontal);
        let vertical = self.stroke_mask(image, Direction::Vertical);

        let joints = morphology::intersect(&horizontal, &vertical);
        if morphology::is_blank(&joints) {
            tracing::debug!("no grid intersections found");
            return Vec::new();
        }

        let grid = morphology::close_small(&morphology::union(&horizontal, &vertical));
        let floor = CellSizeFloor {
            min_width: image.width() / self.config.min_cell_width_divisor.max(1),
            min_height: image.height() / self.config.min_cell_height_divisor.max(1),
        };
        let rects: Vec<BBox> = rectangles::hole_rectangles(&grid, floor)
            .into_iter()
            .map(|r| r.scale(1.0 / image.scale))
            .collect();
        tracing::debug!("found {} grid cell rectangles", rects.len());
        rects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn white(width: u32, height: u32) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([255]))
    }

    fn draw_hline(img: &mut GrayImage, y: u32, x0: u32, x1: u32) {
        for x in x0..x1 {
            img.put_pixel(x, y, Luma([0]));
        }
    }

    fn draw_vline(img: &mut GrayImage, x: u32, y0: u32, y1: u32) {
        for y in y0..y1 {
            img.put_pixel(x, y, Luma([0]));
        }
    }

    #[test]
    fn ruled_lines_are_reported() {
        let mut img = white(400, 300);
        draw_hline(&mut img, 100, 20, 380);
        draw_hline(&mut img, 200, 20, 380);
        let detector = MorphologyGridDetector::default();
        let lines = detector.horizontal_lines(&SourceImage::from_gray(img, 1024));
        assert_eq!(lines, vec![100.0, 200.0]);
    }

    #[test]
    fn blank_image_has_no_lines_or_cells() {
        let img = SourceImage::from_gray(white(400, 300), 1024);
        let detector = MorphologyGridDetector::default();
        assert!(detector.horizontal_lines(&img).is_empty());
        assert!(detector.cell_rectangles(&img).is_empty());
    }

    #[test]
    fn short_strokes_are_not_lines() {
        let mut img = white(400, 300);
        // Text-like dashes well under the minimum line length.
        for x0 in (20..380).step_by(12) {
            draw_hline(&mut img, 150, x0, x0 + 4);
        }
        let detector = MorphologyGridDetector::default();
        assert!(detector
            .horizontal_lines(&SourceImage::from_gray(img, 1024))
            .is_empty());
    }

    #[test]
    fn drawn_grid_yields_four_cells() {
        let mut img = white(200, 200);
        for r in [10, 100, 190] {
            for t in 0..2 {
                draw_hline(&mut img, r + t, 10, 192);
                draw_vline(&mut img, r + t, 10, 192);
            }
        }
        let detector = MorphologyGridDetector::default();
        let rects = detector.cell_rectangles(&SourceImage::from_gray(img, 1024));
        assert_eq!(rects.len(), 4);
        for r in &rects {
            assert!(r.width() > 80.0 && r.height() > 80.0, "{r:?}");
        }
    }

    #[test]
    fn rule_positions_map_back_to_source_scale() {
        let mut img = white(2048, 600);
        draw_hline(&mut img, 300, 0, 2048);
        draw_hline(&mut img, 301, 0, 2048);
        let detector = MorphologyGridDetector::default();
        let lines = detector.horizontal_lines(&SourceImage::from_gray(img, 1024));
        assert!(!lines.is_empty());
        assert!(lines.iter().all(|y| (*y - 300.0).abs() <= 3.0), "{lines:?}");
    }
}
