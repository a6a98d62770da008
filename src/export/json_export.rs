use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::confidence::{cell_bucket, ConfidenceBucket};
use crate::core::model::{Cell, Classification, Table};
use crate::export::Exporter;

#[derive(Debug, Clone)]
pub struct JsonExporter {
    out_dir: PathBuf,
}

impl JsonExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

#[derive(Serialize)]
struct JsonCell<'a> {
    #[serde(flatten)]
    cell: &'a Cell,
    bucket: ConfidenceBucket,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    cells: Vec<JsonCell<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    classification: Option<&'a Classification>,
    warning: &'a str,
}

#[derive(Serialize)]
struct JsonTable<'a> {
    columns: &'a [String],
    rows: Vec<JsonRow<'a>>,
}

pub fn to_json(table: &Table) -> Result<String> {
    let view = JsonTable {
        columns: &table.columns,
        rows: table
            .rows
            .iter()
            .map(|row| JsonRow {
                cells: row
                    .cells
                    .iter()
                    .map(|cell| JsonCell {
                        cell,
                        bucket: cell_bucket(cell),
                    })
                    .collect(),
                classification: row.classification.as_ref(),
                warning: &row.warning,
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&view)?)
}

impl Exporter for JsonExporter {
    fn export(&self, table: &Table) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join("table.json");
        fs::write(&path, to_json(table)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
