pub mod detections;
pub mod image_source;

use anyhow::Result;
use std::path::PathBuf;

use crate::core::model::Detection;

pub use image_source::SourceImage;

/// Supplies the OCR engine's output for one image.
pub trait DetectionSource {
    fn detections(&self) -> Result<Vec<Detection>>;
}

/// Detections previously written to disk as JSON by an OCR run.
#[derive(Debug, Clone)]
pub struct DetectionFile {
    path: PathBuf,
}

impl DetectionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DetectionSource for DetectionFile {
    fn detections(&self) -> Result<Vec<Detection>> {
        let dets = detections::load_detections(&self.path)?;
        tracing::debug!("loaded {} detections from {}", dets.len(), self.path.display());
        Ok(dets)
    }
}

impl DetectionSource for Vec<Detection> {
    fn detections(&self) -> Result<Vec<Detection>> {
        Ok(detections::sanitize(self.iter().cloned()))
    }
}
