use serde::{Deserialize, Serialize};

use crate::core::geometry::{BBox, Quad};

/// One recognized text fragment from the OCR engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    #[serde(rename = "box")]
    pub quad: Quad,
    pub text: String,
    pub confidence: f32,
}

impl Detection {
    pub fn new(quad: Quad, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            quad,
            text: text.into(),
            confidence,
        }
    }

    pub fn bbox(&self) -> BBox {
        self.quad.bbox()
    }

    pub fn mid_y(&self) -> f32 {
        self.quad.mid_y()
    }
}

/// Ascending y-coordinates partitioning an image into horizontal bands.
pub type RowBounds = Vec<i32>;

/// Where a cell's text came from. Manual cells are trusted regardless of
/// their numeric confidence.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CellOrigin {
    #[default]
    Ocr,
    Manual,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cell {
    pub text: String,
    pub confidence: f32,
    #[serde(default)]
    pub origin: CellOrigin,
}

impl Cell {
    pub fn ocr(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
            origin: CellOrigin::Ocr,
        }
    }

    pub fn manual(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: 0.0,
            origin: CellOrigin::Manual,
        }
    }

    /// Placeholder for a grid cell with no detections.
    pub fn empty() -> Self {
        Self::ocr("", 0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Linked,
    Unlinked,
}

impl RowKind {
    pub fn label(&self) -> &'static str {
        match self {
            RowKind::Linked => "linked",
            RowKind::Unlinked => "unlinked",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationOrigin {
    #[default]
    Auto,
    Manual,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    #[serde(rename = "type")]
    pub kind: RowKind,
    pub matched_reference: String,
    pub needs_review: bool,
    #[serde(rename = "similarityScore")]
    pub similarity: f32,
    #[serde(default)]
    pub origin: ClassificationOrigin,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TableRow {
    pub cells: Vec<Cell>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub classification: Option<Classification>,
    #[serde(default)]
    pub warning: String,
}

impl TableRow {
    pub fn with_width(width: usize) -> Self {
        Self {
            cells: vec![Cell::empty(); width],
            classification: None,
            warning: String::new(),
        }
    }

    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            classification: None,
            warning: String::new(),
        }
    }

    pub fn text(&self, column: usize) -> &str {
        self.cells.get(column).map(|c| c.text.as_str()).unwrap_or("")
    }

    pub fn is_blank(&self) -> bool {
        self.classification.is_none() && self.cells.iter().all(Cell::is_empty)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    pub target: String,
    pub rating: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MatchReport {
    pub best_match: MatchResult,
    pub all_matches: Vec<MatchResult>,
}
