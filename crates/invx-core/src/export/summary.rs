//! Per-document run summary.

use std::path::Path;

use super::Result;
use crate::batch::BatchReport;
use crate::error::ExportError;

/// Write a CSV with one line per processed document.
pub fn write_summary(path: &Path, report: &BatchReport) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "filename",
        "status",
        "order_id",
        "line_items",
        "missing_fields",
        "processing_time_ms",
        "error",
    ])?;

    for outcome in &report.outcomes {
        let filename = outcome.file_name();
        let time_ms = outcome.processing_time_ms.to_string();

        match &outcome.result {
            Ok(record) => {
                wtr.write_record([
                    filename.as_str(),
                    "success",
                    record.order_id.as_deref().unwrap_or_default(),
                    record.line_items.len().to_string().as_str(),
                    record.missing_fields().len().to_string().as_str(),
                    time_ms.as_str(),
                    "",
                ])?;
            }
            Err(e) => {
                wtr.write_record([
                    filename.as_str(),
                    "error",
                    "",
                    "",
                    "",
                    time_ms.as_str(),
                    e.source.to_string().as_str(),
                ])?;
            }
        }
    }

    let data = wtr.into_inner().map_err(|e| ExportError::Io(e.into_error()))?;
    std::fs::write(path, data).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}
