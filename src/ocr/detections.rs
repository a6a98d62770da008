use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::geometry::Quad;
use crate::core::model::Detection;

/// Either the native `{box, text, confidence}` object or a PaddleOCR
/// `[[quad], [text, confidence]]` pair.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Native(Detection),
    Paddle(Quad, (String, f32)),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Flat(Vec<RawEntry>),
    Paged(Vec<Vec<RawEntry>>),
}

impl From<RawEntry> for Detection {
    fn from(entry: RawEntry) -> Self {
        match entry {
            RawEntry::Native(det) => det,
            RawEntry::Paddle(quad, (text, confidence)) => Detection::new(quad, text, confidence),
        }
    }
}

pub fn parse_detections(raw: &str) -> Result<Vec<Detection>> {
    let document: RawDocument =
        serde_json::from_str(raw).with_context(|| "failed to parse OCR detections JSON")?;
    let entries = match document {
        RawDocument::Flat(entries) => entries,
        RawDocument::Paged(pages) => {
            if pages.len() > 1 {
                tracing::warn!("detections hold {} pages; using the first", pages.len());
            }
            pages.into_iter().next().unwrap_or_default()
        }
    };
    Ok(sanitize(entries.into_iter().map(Detection::from)))
}

pub fn load_detections(path: &Path) -> Result<Vec<Detection>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read detections {}", path.display()))?;
    parse_detections(&raw).with_context(|| format!("invalid detections {}", path.display()))
}

/// Trims text, drops empty fragments and unusable geometry, clamps confidence.
pub fn sanitize(detections: impl IntoIterator<Item = Detection>) -> Vec<Detection> {
    detections
        .into_iter()
        .filter_map(|mut det| {
            if !det.quad.is_finite() {
                tracing::warn!("skipping detection {:?} with non-finite box", det.text);
                return None;
            }
            let trimmed = det.text.trim();
            if trimmed.is_empty() {
                return None;
            }
            det.text = trimmed.to_string();
            det.confidence = if det.confidence.is_finite() {
                det.confidence.clamp(0.0, 1.0)
            } else {
                0.0
            };
            Some(det)
        })
        .collect()
}
