use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::model::{Cell, Table, TableRow};
use crate::export::Exporter;

const TYPE_HEADER: &str = "type";
const REFERENCE_HEADER: &str = "matched_reference";
const WARNING_HEADER: &str = "warning";

/// Flat, row-major export: one column per schema column, then the row's
/// classification and warning.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    out_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

pub fn write_csv<W: std::io::Write>(table: &Table, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = table.columns.iter().map(String::as_str).collect();
    header.extend([TYPE_HEADER, REFERENCE_HEADER, WARNING_HEADER]);
    out.write_record(&header)?;

    for row in &table.rows {
        let mut record: Vec<&str> = (0..table.columns.len()).map(|idx| row.text(idx)).collect();
        match &row.classification {
            Some(class) => {
                record.push(class.kind.label());
                record.push(&class.matched_reference);
            }
            None => record.extend(["", ""]),
        }
        record.push(&row.warning);
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}

/// Reads back the table columns of a CSV export. Only cell text survives;
/// confidence, classification and warnings are not restored.
pub fn read_csv<R: Read>(reader: R, columns: &[String]) -> Result<Table> {
    let mut input = csv::Reader::from_reader(reader);
    let headers = input.headers()?.clone();

    let mut positions = Vec::with_capacity(columns.len());
    for column in columns {
        match headers.iter().position(|h| h == column) {
            Some(pos) => positions.push(pos),
            None => bail!("CSV is missing column `{column}`"),
        }
    }

    let mut table = Table::new(columns.to_vec());
    for record in input.records() {
        let record = record?;
        let cells = positions
            .iter()
            .map(|&pos| Cell::manual(record.get(pos).unwrap_or("")))
            .collect();
        table.rows.push(TableRow::from_cells(cells));
    }
    Ok(table)
}

pub fn import_csv(path: &Path, columns: &[String]) -> Result<Table> {
    let file =
        fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_csv(file, columns).with_context(|| format!("invalid table CSV {}", path.display()))
}

impl Exporter for CsvExporter {
    fn export(&self, table: &Table) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join("table.csv");
        let file = fs::File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        write_csv(table, file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{CellOrigin, Classification, ClassificationOrigin, RowKind};
    use pretty_assertions::assert_eq;

    fn sample() -> Table {
        let mut table = Table::new(vec!["Part Number".to_string(), "Description".to_string()]);
        table.rows.push(TableRow {
            classification: Some(Classification {
                kind: RowKind::Linked,
                matched_reference: "AB-123".to_string(),
                needs_review: false,
                similarity: 1.0,
                origin: ClassificationOrigin::Auto,
            }),
            warning: "Caution in Description value".to_string(),
            ..TableRow::from_cells(vec![
                Cell::ocr("AB-123", 0.99),
                Cell::ocr("BRACKET, \"L\" TYPE", 0.9),
            ])
        });
        table
            .rows
            .push(TableRow::from_cells(vec![Cell::empty(), Cell::manual("WASHER\nM8")]));
        table
    }

    fn texts(table: &Table) -> Vec<Vec<String>> {
        table
            .rows
            .iter()
            .map(|r| r.cells.iter().map(|c| c.text.clone()).collect())
            .collect()
    }

    #[test]
    fn export_then_import_keeps_cell_text() {
        let table = sample();
        let mut buf = Vec::new();
        write_csv(&table, &mut buf).unwrap();
        let back = read_csv(buf.as_slice(), &table.columns).unwrap();
        assert_eq!(back.columns, table.columns);
        assert_eq!(texts(&back), texts(&table));
    }

    #[test]
    fn imported_cells_are_manual_and_raise_no_caution() {
        let mut buf = Vec::new();
        write_csv(&sample(), &mut buf).unwrap();
        let back = read_csv(buf.as_slice(), &sample().columns).unwrap();
        assert!(back
            .rows
            .iter()
            .flat_map(|r| &r.cells)
            .all(|c| c.origin == CellOrigin::Manual));

        let schema = crate::config::TableConfig::from_toml_str(
            r#"
            [[columns]]
            name = "Part Number"
            role = "identifier"

            [[columns]]
            name = "Description"
            role = "data"
            "#,
        )
        .unwrap();
        assert_eq!(crate::review::row_warning(&back.rows[0], &schema), "");
    }

    #[test]
    fn header_lists_columns_then_row_metadata() {
        let mut buf = Vec::new();
        write_csv(&sample(), &mut buf).unwrap();
        let raw = String::from_utf8(buf).unwrap();
        let first = raw.lines().next().unwrap();
        assert_eq!(first, "Part Number,Description,type,matched_reference,warning");
        assert!(raw.contains("linked,AB-123,Caution in Description value"));
    }

    #[test]
    fn import_requires_every_column() {
        let raw = "Part Number,type\nAB-1,linked\n";
        let err = read_csv(raw.as_bytes(), &["Quantity".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Quantity"));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let table = sample();
        CsvExporter::new(dir.path().to_path_buf())
            .export(&table)
            .unwrap();
        let back = import_csv(&dir.path().join("table.csv"), &table.columns).unwrap();
        assert_eq!(texts(&back), texts(&table));
    }
}
