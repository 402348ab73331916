//! JSON exporter for generated records.
//!
//! The artifact is a pretty-printed JSON array of materialized record
//! documents, either written to a file or returned as text for copying.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::infrastructure::ports::ClockPort;

/// A batch of materialized records ready for export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    pub exported_at: DateTime<Utc>,
    pub records: Vec<Value>,
}

impl ExportDocument {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Pretty-printed JSON array of the records.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.records).context("Failed to serialize export")
    }
}

pub struct JsonExporter {
    clock: Arc<dyn ClockPort>,
}

impl JsonExporter {
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        Self { clock }
    }

    /// Stamp a set of record documents for export.
    pub fn export(&self, records: Vec<Value>) -> ExportDocument {
        ExportDocument {
            exported_at: self.clock.now(),
            records,
        }
    }

    /// Write `document` to `path` as pretty JSON.
    pub async fn write_to_file(&self, document: &ExportDocument, path: &Path) -> Result<()> {
        let json = document.to_json()?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write export to {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            records = document.len(),
            exported_at = %document.exported_at.to_rfc3339(),
            "Exported generated records"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockClockPort;
    use chrono::TimeZone;
    use serde_json::json;

    fn exporter() -> JsonExporter {
        let mut clock = MockClockPort::new();
        clock
            .expect_now()
            .returning(|| Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).single().unwrap_or_default());
        JsonExporter::new(Arc::new(clock))
    }

    #[test]
    fn export_is_pretty_array() {
        let document = exporter().export(vec![json!({"name": "A"}), json!({"name": "B"})]);
        let text = document.to_json().expect("serializes");

        assert!(text.starts_with('['));
        assert!(text.contains('\n'));
        let parsed: Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(parsed, json!([{"name": "A"}, {"name": "B"}]));
        assert_eq!(document.exported_at.to_rfc3339(), "2026-01-02T03:04:05+00:00");
    }

    #[test]
    fn empty_export_is_empty_array() {
        let document = exporter().export(Vec::new());
        assert!(document.is_empty());
        assert_eq!(document.to_json().expect("serializes"), "[]");
    }

    #[tokio::test]
    async fn writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("npcs.json");
        let exporter = exporter();
        let document = exporter.export(vec![json!({"name": "Grumbar"})]);

        exporter
            .write_to_file(&document, &path)
            .await
            .expect("written");

        let written = std::fs::read_to_string(&path).expect("readable");
        let parsed: Value = serde_json::from_str(&written).expect("valid json");
        assert_eq!(parsed[0]["name"], "Grumbar");
    }
}
