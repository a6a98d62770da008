use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::model::Table;
use crate::export::Exporter;

/// Plain text copy of the table: one line per non-blank row.
#[derive(Debug, Clone)]
pub struct TextExporter {
    out_dir: PathBuf,
}

impl TextExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

pub fn to_text(table: &Table) -> String {
    let mut text = String::new();
    for row in &table.rows {
        if row.is_blank() {
            continue;
        }
        let line = row
            .cells
            .iter()
            .map(|c| c.text.trim())
            .collect::<Vec<_>>()
            .join("\t");
        text.push_str(line.trim_end_matches('\t'));
        text.push('\n');
    }
    text
}

impl Exporter for TextExporter {
    fn export(&self, table: &Table) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join("table.txt");
        fs::write(&path, to_text(table))
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Cell, TableRow};

    #[test]
    fn one_line_per_row_with_tabs() {
        let mut table = Table::new(vec!["A".into(), "B".into(), "C".into()]);
        table.rows.push(TableRow::from_cells(vec![
            Cell::ocr("AB-1", 0.9),
            Cell::ocr("2", 0.9),
            Cell::empty(),
        ]));
        table.rows.push(TableRow::with_width(3));
        table
            .rows
            .push(TableRow::from_cells(vec![Cell::ocr("Hello world", 0.9)]));
        assert_eq!(to_text(&table), "AB-1\t2\nHello world\n");
    }
}
