pub mod csv_export;
pub mod json_export;
pub mod payload_export;
pub mod text_export;

use anyhow::Result;

use crate::core::model::Table;

pub use csv_export::{import_csv, CsvExporter};
pub use json_export::JsonExporter;
pub use payload_export::PayloadExporter;
pub use text_export::TextExporter;

pub trait Exporter {
    fn export(&self, table: &Table) -> Result<()>;
}
