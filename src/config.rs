use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matching::Scorer;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    /// Drives reference matching and row classification.
    Identifier,
    Data,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub role: ColumnRole,
    #[serde(default)]
    pub required: bool,
    /// One short value per visual line; always assembled in simple mode.
    #[serde(default)]
    pub line_per_row: bool,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, role: ColumnRole) -> Self {
        Self {
            name: name.into(),
            role,
            required: false,
            line_per_row: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn line_per_row(mut self) -> Self {
        self.line_per_row = true;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    /// Pixels at or below this intensity are foreground strokes.
    pub binarize_threshold: u8,
    /// Opening kernel length is `max(min_kernel, extent / kernel_divisor)`.
    pub kernel_divisor: u32,
    pub min_kernel: u32,
    /// Shortest accepted segment is `width / min_line_divisor`.
    pub min_line_divisor: u32,
    pub max_line_gap: u32,
    pub vote_threshold: u32,
    pub min_cell_width_divisor: u32,
    pub min_cell_height_divisor: u32,
    /// Lower bound for the band clustering tolerance, in pixels.
    pub min_band_tolerance: f32,
    /// Longest image side used for grid detection; 0 disables downscaling.
    pub max_dimension: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            binarize_threshold: 150,
            kernel_divisor: 80,
            min_kernel: 5,
            min_line_divisor: 40,
            max_line_gap: 5,
            vote_threshold: 30,
            min_cell_width_divisor: 20,
            min_cell_height_divisor: 30,
            min_band_tolerance: 20.0,
            max_dimension: 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchingConfig {
    pub scorer: Scorer,
    /// Ratings strictly above this link the row to a reference.
    pub link_threshold: f32,
    /// Ratings below this are flagged for review even when linked.
    pub review_threshold: f32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            scorer: Scorer::Sequential,
            link_threshold: 0.85,
            review_threshold: 0.95,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TableConfig {
    pub columns: Vec<ColumnSpec>,
    pub grid: GridConfig,
    pub matching: MatchingConfig,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            columns: vec![
                ColumnSpec::new("Part Number", ColumnRole::Identifier),
                ColumnSpec::new("Quantity", ColumnRole::Data)
                    .required()
                    .line_per_row(),
                ColumnSpec::new("Description", ColumnRole::Data),
                ColumnSpec::new("Material", ColumnRole::Data),
            ],
            grid: GridConfig::default(),
            matching: MatchingConfig::default(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("table schema has no columns")]
    NoColumns,
    #[error("column `{0}` is declared more than once")]
    DuplicateColumn(String),
    #[error("expected exactly one identifier column, found {0}")]
    IdentifierCount(usize),
    #[error("{name} must lie in [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f32 },
    #[error("link threshold {link} exceeds review threshold {review}")]
    ThresholdOrder { link: f32, review: f32 },
    #[error("unknown column `{0}`")]
    UnknownColumn(String),
}

impl TableConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: TableConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns.is_empty() {
            return Err(ConfigError::NoColumns);
        }
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ConfigError::DuplicateColumn(column.name.clone()));
            }
        }
        let identifiers = self
            .columns
            .iter()
            .filter(|c| c.role == ColumnRole::Identifier)
            .count();
        if identifiers != 1 {
            return Err(ConfigError::IdentifierCount(identifiers));
        }

        let m = &self.matching;
        for (name, value) in [
            ("link_threshold", m.link_threshold),
            ("review_threshold", m.review_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }
        if m.link_threshold > m.review_threshold {
            return Err(ConfigError::ThresholdOrder {
                link: m.link_threshold,
                review: m.review_threshold,
            });
        }
        Ok(())
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, ConfigError> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| ConfigError::UnknownColumn(name.to_string()))
    }

    pub fn column(&self, name: &str) -> Result<&ColumnSpec, ConfigError> {
        self.column_index(name).map(|idx| &self.columns[idx])
    }

    /// Position of the identifier column; `validate` guarantees there is one.
    pub fn identifier_index(&self) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.role == ColumnRole::Identifier)
    }
}
