use std::ops::Range;

use thiserror::Error;

use crate::config::{MatchingConfig, TableConfig};
use crate::core::model::{
    Cell, Classification, ClassificationOrigin, RowKind, Table, TableRow,
};
use crate::matching::{classify_identifier, ReferenceSet};
use crate::review;

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("unknown column `{0}`")]
    UnknownColumn(String),
    #[error("row {row} is out of range (table has {rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },
    #[error("schema has no identifier column")]
    NoIdentifier,
}

/// Cells lifted out of one column, with their confidence and origin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clip {
    pub cells: Vec<Cell>,
}

/// Editable table state for one document.
///
/// Columns arrive one at a time from extraction, users correct cells and
/// classifications, and matching fills in whatever is still unclassified.
#[derive(Debug, Clone)]
pub struct TableSession {
    schema: TableConfig,
    rows: Vec<TableRow>,
    clipboard: Option<Clip>,
}

impl TableSession {
    pub fn new(schema: TableConfig) -> Self {
        Self {
            schema,
            rows: Vec::new(),
            clipboard: None,
        }
    }

    /// Starts from already assembled rows, padded or cut to the schema width.
    pub fn with_rows(schema: TableConfig, mut rows: Vec<TableRow>) -> Self {
        let width = schema.columns.len();
        for row in &mut rows {
            row.cells.resize(width, Cell::empty());
        }
        Self {
            schema,
            rows,
            clipboard: None,
        }
    }

    pub fn schema(&self) -> &TableConfig {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn clipboard(&self) -> Option<&Clip> {
        self.clipboard.as_ref()
    }

    fn column(&self, name: &str) -> Result<usize, SessionError> {
        self.schema
            .column_index(name)
            .map_err(|_| SessionError::UnknownColumn(name.to_string()))
    }

    /// Edits may land on an existing row or append directly after the last.
    fn check_appendable(&self, row: usize) -> Result<(), SessionError> {
        if row > self.rows.len() {
            return Err(SessionError::RowOutOfRange {
                row,
                rows: self.rows.len(),
            });
        }
        Ok(())
    }

    fn grow_to(&mut self, len: usize) {
        let width = self.schema.columns.len();
        while self.rows.len() < len {
            self.rows.push(TableRow::with_width(width));
        }
    }

    /// Writes an extracted column top-down. Rows past the end of `cells`
    /// keep what they had.
    pub fn load_column(&mut self, name: &str, cells: Vec<Cell>) -> Result<(), SessionError> {
        let col = self.column(name)?;
        self.grow_to(cells.len());
        let count = cells.len();
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.cells[col] = cell;
        }
        tracing::debug!(column = name, "loaded {count} cells; table has {} rows", self.rows.len());
        Ok(())
    }

    pub fn edit_cell(&mut self, row: usize, column: &str, text: &str) -> Result<(), SessionError> {
        let col = self.column(column)?;
        self.check_appendable(row)?;
        self.grow_to(row + 1);
        self.rows[row].cells[col] = Cell::manual(text);
        Ok(())
    }

    /// Lifts `rows` of `column` into the clipboard and clears them.
    pub fn cut(&mut self, column: &str, rows: Range<usize>) -> Result<Clip, SessionError> {
        let col = self.column(column)?;
        if rows.start > rows.end || rows.end > self.rows.len() {
            return Err(SessionError::RowOutOfRange {
                row: rows.end.saturating_sub(1),
                rows: self.rows.len(),
            });
        }
        let cells: Vec<Cell> = self.rows[rows]
            .iter_mut()
            .map(|row| std::mem::replace(&mut row.cells[col], Cell::empty()))
            .collect();
        let clip = Clip { cells };
        self.clipboard = Some(clip.clone());
        Ok(clip)
    }

    /// Writes `clip` into `column` starting at `start`, growing the table as
    /// needed. `start` may be at most one past the last row. Confidence and
    /// origin travel with the text.
    pub fn paste(&mut self, clip: &Clip, column: &str, start: usize) -> Result<(), SessionError> {
        let col = self.column(column)?;
        self.check_appendable(start)?;
        self.grow_to(start + clip.cells.len());
        for (offset, cell) in clip.cells.iter().enumerate() {
            self.rows[start + offset].cells[col] = cell.clone();
        }
        Ok(())
    }

    /// Records a human decision; matching never replaces it.
    pub fn confirm(&mut self, row: usize, kind: RowKind, reference: &str) -> Result<(), SessionError> {
        let rows = self.rows.len();
        let target = self
            .rows
            .get_mut(row)
            .ok_or(SessionError::RowOutOfRange { row, rows })?;
        target.classification = Some(Classification {
            kind,
            matched_reference: reference.trim().to_string(),
            needs_review: false,
            similarity: 1.0,
            origin: ClassificationOrigin::Manual,
        });
        Ok(())
    }

    pub fn clear_classification(&mut self, row: usize) -> Result<(), SessionError> {
        let rows = self.rows.len();
        let target = self
            .rows
            .get_mut(row)
            .ok_or(SessionError::RowOutOfRange { row, rows })?;
        target.classification = None;
        Ok(())
    }

    /// Classifies rows that have an identifier and no classification yet.
    /// Returns how many rows were classified.
    pub fn apply_matching(
        &mut self,
        references: &ReferenceSet,
        config: &MatchingConfig,
    ) -> Result<usize, SessionError> {
        let col = self
            .schema
            .identifier_index()
            .ok_or(SessionError::NoIdentifier)?;
        let mut classified = 0usize;
        for row in &mut self.rows {
            if row.classification.is_some() {
                continue;
            }
            let identifier = row.text(col).trim().to_string();
            if identifier.is_empty() {
                continue;
            }
            row.classification = Some(classify_identifier(&identifier, references, config));
            classified += 1;
        }
        tracing::info!("classified {classified} rows against {} references", references.len());
        Ok(classified)
    }

    /// The current table with warnings attached.
    pub fn table(&self) -> Table {
        let mut table = Table {
            columns: self.schema.column_names(),
            rows: self.rows.clone(),
        };
        review::annotate(&mut table, &self.schema);
        table
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.clipboard = None;
    }
}
