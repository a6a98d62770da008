use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;

pub const ON: u8 = 255;
pub const OFF: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Horizontal,
    Vertical,
}

/// Foreground (dark) strokes become `ON`.
pub fn binarize_inverted(gray: &GrayImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] <= threshold {
            Luma([ON])
        } else {
            Luma([OFF])
        }
    })
}

pub fn kernel_len(extent: u32, divisor: u32, min: u32) -> u32 {
    (extent / divisor.max(1)).max(min)
}

/// Binary opening with a straight line kernel of length `len`.
///
/// For a 1-pixel-thick kernel, erode-then-dilate keeps exactly the runs of at
/// least `len` consecutive on-pixels along `direction`, so it is computed as a
/// run-length filter.
pub fn open_lines(mask: &GrayImage, direction: Direction, len: u32) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut out = GrayImage::new(width, height);
    let (outer, inner) = match direction {
        Direction::Horizontal => (height, width),
        Direction::Vertical => (width, height),
    };
    let at = |o: u32, i: u32| match direction {
        Direction::Horizontal => (i, o),
        Direction::Vertical => (o, i),
    };

    for o in 0..outer {
        let mut run_start: Option<u32> = None;
        for i in 0..=inner {
            let on = i < inner && {
                let (x, y) = at(o, i);
                mask.get_pixel(x, y)[0] != OFF
            };
            match (on, run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    if i - start >= len {
                        for k in start..i {
                            let (x, y) = at(o, k);
                            out.put_pixel(x, y, Luma([ON]));
                        }
                    }
                    run_start = None;
                }
                _ => {}
            }
        }
    }
    out
}

pub fn intersect(a: &GrayImage, b: &GrayImage) -> GrayImage {
    combine(a, b, |p, q| p && q)
}

pub fn union(a: &GrayImage, b: &GrayImage) -> GrayImage {
    combine(a, b, |p, q| p || q)
}

fn combine(a: &GrayImage, b: &GrayImage, op: impl Fn(bool, bool) -> bool) -> GrayImage {
    let width = a.width().min(b.width());
    let height = a.height().min(b.height());
    GrayImage::from_fn(width, height, |x, y| {
        if op(a.get_pixel(x, y)[0] != OFF, b.get_pixel(x, y)[0] != OFF) {
            Luma([ON])
        } else {
            Luma([OFF])
        }
    })
}

/// Bridges one-pixel breaks in ruled strokes.
pub fn close_small(mask: &GrayImage) -> GrayImage {
    imageproc::morphology::close(mask, Norm::LInf, 1)
}

pub fn is_blank(mask: &GrayImage) -> bool {
    mask.pixels().all(|p| p[0] == OFF)
}
