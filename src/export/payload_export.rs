use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::{ColumnRole, TableConfig};
use crate::core::model::{RowKind, Table};
use crate::export::Exporter;
use crate::review::validate_required;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PayloadRow {
    pub reference: String,
    pub fields: BTreeMap<String, String>,
    pub warning: String,
}

/// Rows ready for submission, split by classification.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Payload {
    pub linked: Vec<PayloadRow>,
    pub unlinked: Vec<PayloadRow>,
}

impl Payload {
    /// Fails when the table does not pass required-field validation.
    pub fn build(table: &Table, schema: &TableConfig) -> Result<Self> {
        validate_required(table, schema)?;

        let data_columns: Vec<(usize, &str)> = schema
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.role == ColumnRole::Data)
            .map(|(idx, c)| (idx, c.name.as_str()))
            .collect();

        let mut payload = Payload::default();
        for row in &table.rows {
            let Some(class) = &row.classification else {
                continue;
            };
            let entry = PayloadRow {
                reference: class.matched_reference.trim().to_string(),
                fields: data_columns
                    .iter()
                    .map(|&(idx, name)| (name.to_string(), row.text(idx).trim().to_string()))
                    .collect(),
                warning: row.warning.clone(),
            };
            match class.kind {
                RowKind::Linked => payload.linked.push(entry),
                RowKind::Unlinked => payload.unlinked.push(entry),
            }
        }
        tracing::info!(
            linked = payload.linked.len(),
            unlinked = payload.unlinked.len(),
            "built submission payload"
        );
        Ok(payload)
    }
}

#[derive(Debug, Clone)]
pub struct PayloadExporter {
    out_dir: PathBuf,
    schema: TableConfig,
}

impl PayloadExporter {
    pub fn new(out_dir: PathBuf, schema: TableConfig) -> Self {
        Self { out_dir, schema }
    }
}

impl Exporter for PayloadExporter {
    fn export(&self, table: &Table) -> Result<()> {
        let payload = Payload::build(table, &self.schema)?;
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join("payload.json");
        fs::write(&path, serde_json::to_string_pretty(&payload)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Cell, Classification, ClassificationOrigin, TableRow};
    use pretty_assertions::assert_eq;

    fn classified(id: &str, qty: &str, kind: RowKind) -> TableRow {
        TableRow {
            classification: Some(Classification {
                kind,
                matched_reference: id.to_string(),
                needs_review: kind == RowKind::Unlinked,
                similarity: 1.0,
                origin: ClassificationOrigin::Auto,
            }),
            ..TableRow::from_cells(vec![
                Cell::ocr(id, 0.99),
                Cell::ocr(qty, 0.99),
                Cell::ocr(" BRACKET ", 0.99),
                Cell::empty(),
            ])
        }
    }

    #[test]
    fn rows_split_by_classification() {
        let schema = TableConfig::default();
        let mut table = Table::new(schema.column_names());
        table.rows.push(classified("AB-123", "2", RowKind::Linked));
        table.rows.push(classified("BO-77", "1", RowKind::Unlinked));
        table.rows.push(TableRow::with_width(4));

        let payload = Payload::build(&table, &schema).unwrap();
        assert_eq!(payload.linked.len(), 1);
        assert_eq!(payload.unlinked.len(), 1);
        let row = &payload.linked[0];
        assert_eq!(row.reference, "AB-123");
        assert_eq!(row.fields["Quantity"], "2");
        assert_eq!(row.fields["Description"], "BRACKET");
        assert_eq!(row.fields["Material"], "");
        assert!(!row.fields.contains_key("Part Number"));
    }

    #[test]
    fn invalid_table_is_refused() {
        let schema = TableConfig::default();
        let mut table = Table::new(schema.column_names());
        table.rows.push(classified("AB-123", "", RowKind::Linked));

        let dir = tempfile::tempdir().unwrap();
        let exporter = PayloadExporter::new(dir.path().to_path_buf(), schema);
        assert!(exporter.export(&table).is_err());
        assert!(!dir.path().join("payload.json").exists());
    }
}
