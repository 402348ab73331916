//! Export of generated records.

mod json_exporter;

pub use json_exporter::{ExportDocument, JsonExporter};
