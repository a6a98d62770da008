use std::fmt;

use thiserror::Error;

use crate::config::{ColumnRole, TableConfig};
use crate::core::confidence::TRUSTED_THRESHOLD;
use crate::core::model::{CellOrigin, Table, TableRow};

pub const REVIEW_NOTICE: &str = "Verify whether the row is linked or unlinked";
pub const SIMILARITY_NOTICE: &str = "Verify the matched identifier and the other fields";

/// Audit text for one row, `; `-joined in a fixed order: the review flag,
/// weak similarity, then one caution per non-empty OCR data cell below the
/// trusted threshold. Manually entered cells never raise a caution.
pub fn row_warning(row: &TableRow, schema: &TableConfig) -> String {
    let mut warnings: Vec<String> = Vec::new();

    if let Some(class) = &row.classification {
        if class.needs_review {
            warnings.push(REVIEW_NOTICE.to_string());
        }
        if class.similarity < schema.matching.review_threshold {
            warnings.push(SIMILARITY_NOTICE.to_string());
        }
    }

    for (idx, column) in schema.columns.iter().enumerate() {
        if column.role != ColumnRole::Data {
            continue;
        }
        let Some(cell) = row.cells.get(idx) else {
            continue;
        };
        if cell.origin == CellOrigin::Ocr
            && !cell.is_empty()
            && cell.confidence < TRUSTED_THRESHOLD
        {
            warnings.push(format!("Caution in {} value", column.name));
        }
    }

    warnings.join("; ")
}

/// Attaches a warning string to every row. Cell text is left untouched.
pub fn annotate(table: &mut Table, schema: &TableConfig) {
    let mut flagged = 0usize;
    for row in &mut table.rows {
        row.warning = row_warning(row, schema);
        if !row.warning.is_empty() {
            flagged += 1;
        }
    }
    tracing::debug!("{flagged} of {} rows carry warnings", table.rows.len());
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingField {
    Column { row: usize, column: String },
    Classification { row: usize },
    Reference { row: usize },
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingField::Column { row, column } => write!(f, "row {}: {column}", row + 1),
            MissingField::Classification { row } => write!(f, "row {}: type", row + 1),
            MissingField::Reference { row } => write!(f, "row {}: matched reference", row + 1),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("table has no rows with data")]
    NoRows,
    #[error("missing required fields: {}", join_missing(.0))]
    MissingFields(Vec<MissingField>),
}

fn join_missing(fields: &[MissingField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Submission check. A row counts once it has a classification or any
/// required cell filled; counted rows need every required cell, a
/// classification, and a non-empty matched reference.
pub fn validate_required(table: &Table, schema: &TableConfig) -> Result<(), ValidationError> {
    let required: Vec<(usize, &str)> = schema
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.required)
        .map(|(idx, c)| (idx, c.name.as_str()))
        .collect();

    let mut counted = 0usize;
    let mut missing = Vec::new();
    for (row_idx, row) in table.rows.iter().enumerate() {
        let filled = |idx: usize| !row.text(idx).trim().is_empty();
        if row.classification.is_none() && !required.iter().any(|&(idx, _)| filled(idx)) {
            continue;
        }
        counted += 1;

        for &(idx, name) in &required {
            if !filled(idx) {
                missing.push(MissingField::Column {
                    row: row_idx,
                    column: name.to_string(),
                });
            }
        }
        match &row.classification {
            None => missing.push(MissingField::Classification { row: row_idx }),
            Some(class) if class.matched_reference.trim().is_empty() => {
                missing.push(MissingField::Reference { row: row_idx })
            }
            Some(_) => {}
        }
    }

    if counted == 0 {
        return Err(ValidationError::NoRows);
    }
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }
    Ok(())
}
