//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::batch::{BatchOptions, FailurePolicy};
use crate::error::InvxError;
use crate::export::ExportFormat;
use crate::invoice::LineItemScope;

/// Main configuration for the invx pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvxConfig {
    /// Input document configuration.
    pub input: InputConfig,

    /// Export configuration.
    pub output: OutputConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,
}

/// Where invoices are read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory containing the invoice PDFs.
    pub directory: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("Documents/invoices"),
        }
    }
}

/// Where and how the consolidated table is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output file path. The parent directory must exist.
    pub path: PathBuf,

    /// Output file format.
    pub format: ExportFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("Output/All_invoices.xlsx"),
            format: ExportFormat::Xlsx,
        }
    }
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Marker that opens the product section. When unset, line items are
    /// matched across the whole document.
    pub section_start: Option<String>,

    /// Marker that closes the product section.
    pub section_end: Option<String>,
}

impl ExtractionConfig {
    /// Line item scope described by this configuration.
    pub fn line_item_scope(&self) -> LineItemScope {
        match &self.section_start {
            Some(start) if !start.is_empty() => LineItemScope::Section {
                start: start.clone(),
                end: self.section_end.clone().filter(|e| !e.is_empty()),
            },
            _ => LineItemScope::Unanchored,
        }
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Keep going when a document cannot be read.
    pub continue_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            continue_on_error: true,
        }
    }
}

impl BatchConfig {
    /// Batch driver options described by this configuration.
    pub fn options(&self) -> BatchOptions {
        BatchOptions {
            failure_policy: if self.continue_on_error {
                FailurePolicy::Continue
            } else {
                FailurePolicy::Abort
            },
        }
    }
}

impl InvxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| InvxError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InvxConfig::default();
        assert_eq!(config.input.directory, PathBuf::from("Documents/invoices"));
        assert_eq!(config.output.path, PathBuf::from("Output/All_invoices.xlsx"));
        assert_eq!(config.output.format, ExportFormat::Xlsx);
        assert_eq!(config.extraction.line_item_scope(), LineItemScope::Unanchored);
        assert_eq!(config.batch.options().failure_policy, FailurePolicy::Continue);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: InvxConfig = serde_json::from_str(
            r#"{ "extraction": { "section_start": "Products" }, "batch": { "continue_on_error": false } }"#,
        )
        .unwrap();

        assert_eq!(config.output.format, ExportFormat::Xlsx);
        assert_eq!(
            config.extraction.line_item_scope(),
            LineItemScope::Section {
                start: "Products".to_string(),
                end: None
            }
        );
        assert_eq!(config.batch.options().failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = InvxConfig::default();
        config.output.format = ExportFormat::Csv;
        config.save(&path).unwrap();

        let loaded = InvxConfig::from_file(&path).unwrap();
        assert_eq!(loaded.output.format, ExportFormat::Csv);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "output": { "format": "pdf" } }"#).unwrap();

        let err = InvxConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, InvxError::Config(_)));

        let err = InvxConfig::from_file(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, InvxError::Io(_)));
    }
}
