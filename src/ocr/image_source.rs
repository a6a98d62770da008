use std::path::Path;

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageReader};

/// Grayscale working copy of a source image.
///
/// Large scans are downscaled before grid detection; `scale` maps working
/// pixels back to the coordinate space the OCR detections use
/// (`source = working / scale`).
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub gray: GrayImage,
    pub scale: f32,
}

impl SourceImage {
    pub fn open(path: &Path, max_dimension: u32) -> Result<Self> {
        let img = ImageReader::open(path)
            .with_context(|| format!("failed to open image {}", path.display()))?
            .with_guessed_format()?
            .decode()
            .with_context(|| format!("failed to decode image {}", path.display()))?;
        Ok(Self::from_dynamic(img, max_dimension))
    }

    pub fn from_dynamic(img: DynamicImage, max_dimension: u32) -> Self {
        Self::from_gray(img.to_luma8(), max_dimension)
    }

    pub fn from_gray(gray: GrayImage, max_dimension: u32) -> Self {
        let (width, height) = gray.dimensions();
        let longest = width.max(height);
        if max_dimension == 0 || longest <= max_dimension {
            return Self { gray, scale: 1.0 };
        }

        let scale = max_dimension as f32 / longest as f32;
        let new_w = ((width as f32 * scale).round() as u32).max(1);
        let new_h = ((height as f32 * scale).round() as u32).max(1);
        tracing::debug!("downscaling {width}x{height} to {new_w}x{new_h} for grid detection");
        let gray = image::imageops::resize(&gray, new_w, new_h, FilterType::Triangle);
        Self { gray, scale }
    }

    pub fn width(&self) -> u32 {
        self.gray.width()
    }

    pub fn height(&self) -> u32 {
        self.gray.height()
    }

    pub fn to_source(&self, working: f32) -> f32 {
        working / self.scale
    }
}
