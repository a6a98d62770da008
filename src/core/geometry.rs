use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Four corner points as emitted by the OCR engine, clockwise from top-left.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(from = "[[f32; 2]; 4]", into = "[[f32; 2]; 4]")]
pub struct Quad(pub [Point; 4]);

impl Quad {
    pub fn from_bbox(bbox: BBox) -> Self {
        Self([
            Point::new(bbox.x0, bbox.y0),
            Point::new(bbox.x1, bbox.y0),
            Point::new(bbox.x1, bbox.y1),
            Point::new(bbox.x0, bbox.y1),
        ])
    }

    pub fn bbox(&self) -> BBox {
        let mut bbox = BBox::new(self.0[0].x, self.0[0].y, self.0[0].x, self.0[0].y);
        for p in &self.0[1..] {
            bbox = bbox.union(&BBox::new(p.x, p.y, p.x, p.y));
        }
        bbox
    }

    /// Vertical midpoint between the top-left and bottom-right corners.
    pub fn mid_y(&self) -> f32 {
        (self.0[0].y + self.0[2].y) * 0.5
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|p| p.x.is_finite() && p.y.is_finite())
    }
}

impl From<[[f32; 2]; 4]> for Quad {
    fn from(points: [[f32; 2]; 4]) -> Self {
        Self(points.map(|[x, y]| Point::new(x, y)))
    }
}

impl From<Quad> for [[f32; 2]; 4] {
    fn from(quad: Quad) -> Self {
        quad.0.map(|p| [p.x, p.y])
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    pub fn center(&self) -> (f32, f32) {
        ((self.x0 + self.x1) * 0.5, (self.y0 + self.y1) * 0.5)
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Inclusive on the top/left edge, exclusive on the bottom/right edge, so
    /// a point on a shared border belongs to exactly one of two neighbours.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    pub fn scale(&self, factor: f32) -> Self {
        Self::new(
            self.x0 * factor,
            self.y0 * factor,
            self.x1 * factor,
            self.y1 * factor,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn quad_bbox_covers_all_corners() {
        let quad = Quad::from([[12.0, 10.0], [40.0, 8.0], [41.0, 20.0], [11.0, 22.0]]);
        assert_eq!(quad.bbox(), BBox::new(11.0, 8.0, 41.0, 22.0));
        assert_eq!(quad.mid_y(), 15.0);
    }

    #[test]
    fn shared_border_belongs_to_one_box() {
        let upper = BBox::new(0.0, 0.0, 10.0, 10.0);
        let lower = BBox::new(0.0, 10.0, 10.0, 20.0);
        assert!(!upper.contains(5.0, 10.0));
        assert!(lower.contains(5.0, 10.0));
    }

    #[test]
    fn quad_serializes_as_point_list() {
        let quad = Quad::from_bbox(BBox::new(1.0, 2.0, 3.0, 4.0));
        let json = serde_json::to_string(&quad).unwrap();
        assert_eq!(json, "[[1.0,2.0],[3.0,2.0],[3.0,4.0],[1.0,4.0]]");
    }
}
