use std::path::Path;

use anyhow::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assembly::{band_tolerance, cluster_boundaries, AssemblyStrategy};
use crate::config::{ColumnSpec, GridConfig, TableConfig};
use crate::core::model::{Cell, Detection, Table, TableRow};
use crate::core::strategy::StrategyKind;
use crate::export::{CsvExporter, Exporter, JsonExporter, PayloadExporter, TextExporter};
use crate::grid::GridProbe;
use crate::matching::ReferenceSet;
use crate::ocr::SourceImage;
use crate::session::{SessionError, TableSession};

/// OCR output for one cropped column, plus the crop itself when available.
#[derive(Debug, Clone)]
pub struct ColumnInput {
    pub name: String,
    pub detections: Vec<Detection>,
    pub image: Option<SourceImage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnExtraction {
    pub strategy: StrategyKind,
    pub cells: Vec<Cell>,
}

/// Rebuilds one column top to bottom.
///
/// Line-per-row columns and columns without an image are always assembled
/// in simple mode; otherwise ruled lines in the image pick banded mode when
/// at least two row boundaries survive clustering.
pub fn extract_column<P: GridProbe + ?Sized>(
    detections: &[Detection],
    image: Option<&SourceImage>,
    probe: &P,
    spec: &ColumnSpec,
    grid: &GridConfig,
) -> ColumnExtraction {
    let bounds = match image {
        Some(image) if !spec.line_per_row => {
            let lines = probe.horizontal_lines(image);
            let tolerance = band_tolerance(detections, grid.min_band_tolerance);
            cluster_boundaries(&lines, tolerance)
        }
        _ => Vec::new(),
    };

    let strategy = AssemblyStrategy::probe(bounds, Vec::new(), spec.line_per_row, false);
    let cells = strategy
        .assemble(detections)
        .into_iter()
        .filter_map(|row| row.into_iter().next())
        .collect();
    ColumnExtraction {
        strategy: strategy.kind(),
        cells,
    }
}

/// Extracts every column in parallel and loads them into a fresh session in
/// input order.
pub fn extract_columns<P: GridProbe + Sync>(
    inputs: &[ColumnInput],
    probe: &P,
    config: &TableConfig,
) -> Result<TableSession, SessionError> {
    let specs = inputs
        .iter()
        .map(|input| {
            config
                .column(&input.name)
                .map_err(|_| SessionError::UnknownColumn(input.name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let extractions: Vec<ColumnExtraction> = inputs
        .par_iter()
        .zip(specs.par_iter())
        .map(|(input, spec)| {
            extract_column(
                &input.detections,
                input.image.as_ref(),
                probe,
                spec,
                &config.grid,
            )
        })
        .collect();

    let mut session = TableSession::new(config.clone());
    for (input, extraction) in inputs.iter().zip(extractions) {
        tracing::info!(
            column = %input.name,
            strategy = ?extraction.strategy,
            "extracted {} cells",
            extraction.cells.len()
        );
        session.load_column(&input.name, extraction.cells)?;
    }
    Ok(session)
}

/// Rebuilds a whole ruled table from one image in rectangle mode.
///
/// Rows are fitted to the schema width. When no grid cells are found each
/// detection becomes its own row with its text in the first column.
pub fn extract_table<P: GridProbe + ?Sized>(
    detections: &[Detection],
    image: &SourceImage,
    probe: &P,
    config: &TableConfig,
) -> TableSession {
    let rectangles = probe.cell_rectangles(image);
    let strategy = AssemblyStrategy::probe(Vec::new(), rectangles, false, true);
    let width = config.columns.len();

    let rows = strategy.assemble(detections);
    tracing::info!(strategy = ?strategy.kind(), "extracted {} table rows", rows.len());

    let rows = rows
        .into_iter()
        .enumerate()
        .map(|(row_idx, mut cells)| {
            if cells.len() > width {
                tracing::warn!(
                    "row {row_idx} has {} cells; keeping the first {width}",
                    cells.len()
                );
            }
            cells.resize(width, Cell::empty());
            TableRow::from_cells(cells)
        })
        .collect();
    TableSession::with_rows(config.clone(), rows)
}

/// Paragraph mode: one cell per detection, top to bottom.
pub fn extract_paragraph(detections: &[Detection]) -> Vec<Cell> {
    AssemblyStrategy::Simple
        .assemble(detections)
        .into_iter()
        .flatten()
        .collect()
}

/// Runs identifier matching over the session and returns the annotated table.
pub fn finalize(session: &mut TableSession, references: &ReferenceSet) -> Result<Table> {
    let matching = session.schema().matching.clone();
    session.apply_matching(references, &matching)?;
    Ok(session.table())
}

pub fn paragraph_table(cells: Vec<Cell>) -> Table {
    let mut table = Table::new(vec!["Text".to_string()]);
    table.rows = cells
        .into_iter()
        .map(|cell| TableRow::from_cells(vec![cell]))
        .collect();
    table
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Text,
    Payload,
}

pub fn export_table(
    table: &Table,
    output: &Path,
    formats: &[ExportFormat],
    schema: &TableConfig,
) -> Result<()> {
    for format in formats {
        let exporter: Box<dyn Exporter> = match format {
            ExportFormat::Json => Box::new(JsonExporter::new(output.to_path_buf())),
            ExportFormat::Csv => Box::new(CsvExporter::new(output.to_path_buf())),
            ExportFormat::Text => Box::new(TextExporter::new(output.to_path_buf())),
            ExportFormat::Payload => {
                Box::new(PayloadExporter::new(output.to_path_buf(), schema.clone()))
            }
        };
        exporter.export(table)?;
        tracing::debug!(?format, "exported table to {}", output.display());
    }
    Ok(())
}
