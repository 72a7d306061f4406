//! PDF processing module.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Converts a document into one linear text string.
pub trait TextExtractor {
    /// Extract the text of every page, concatenated in page order.
    fn extract_text(&self, data: &[u8]) -> Result<String>;
}
