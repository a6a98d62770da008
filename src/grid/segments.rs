use image::GrayImage;

use crate::grid::morphology::OFF;

/// A horizontal run of stroke pixels, allowing short breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub y: u32,
    pub x0: u32,
    pub x1: u32,
    pub votes: u32,
}

impl Segment {
    pub fn len(&self) -> u32 {
        self.x1 - self.x0 + 1
    }

    pub fn is_empty(&self) -> bool {
        self.votes == 0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SegmentParams {
    pub min_length: u32,
    pub max_gap: u32,
    pub vote_threshold: u32,
}

/// Collects horizontal line segments from a stroke mask.
///
/// Segments are grown along each row, bridging breaks of up to `max_gap`
/// pixels. A segment is accepted when it spans at least `min_length` pixels
/// and carries at least `vote_threshold` stroke pixels.
pub fn scan_horizontal(mask: &GrayImage, params: SegmentParams) -> Vec<Segment> {
    let (width, height) = mask.dimensions();
    let mut segments = Vec::new();

    let mut accept = |segment: Segment| {
        if segment.len() >= params.min_length && segment.votes >= params.vote_threshold {
            segments.push(segment);
        }
    };

    for y in 0..height {
        let mut current: Option<Segment> = None;
        let mut gap = 0u32;
        for x in 0..width {
            if mask.get_pixel(x, y)[0] != OFF {
                match current.as_mut() {
                    Some(segment) => {
                        segment.x1 = x;
                        segment.votes += 1;
                    }
                    None => {
                        current = Some(Segment {
                            y,
                            x0: x,
                            x1: x,
                            votes: 1,
                        })
                    }
                }
                gap = 0;
            } else if let Some(segment) = current {
                gap += 1;
                if gap > params.max_gap {
                    accept(segment);
                    current = None;
                    gap = 0;
                }
            }
        }
        if let Some(segment) = current {
            accept(segment);
        }
    }
    segments
}
