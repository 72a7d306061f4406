//! Error types for the invx-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the invx library.
#[derive(Error, Debug)]
pub enum InvxError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// A single document could not be read during a batch that aborts on error.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Writing the export file failed.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// A document that could not be turned into text.
#[derive(Error, Debug)]
#[error("failed to read {}: {source}", path.display())]
pub struct DocumentError {
    /// Path of the failing document.
    pub path: PathBuf,
    /// Underlying cause.
    #[source]
    pub source: DocumentErrorKind,
}

/// Cause of a [`DocumentError`].
#[derive(Error, Debug)]
pub enum DocumentErrorKind {
    /// The file could not be read from disk.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The file was read but is not a usable PDF.
    #[error("{0}")]
    Pdf(#[from] PdfError),
}

impl DocumentError {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<DocumentErrorKind>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Errors raised while writing the tabular export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Destination could not be written (permissions, missing directory, disk full).
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while assembling the output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The XLSX container could not be built.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// A worksheet part could not be serialized.
    #[error("XML error: {0}")]
    Xml(String),
}

/// Result type for the invx library.
pub type Result<T> = std::result::Result<T, InvxError>;
