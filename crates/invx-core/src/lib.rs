//! Core library for fixed-template invoice extraction.
//!
//! This crate provides:
//! - PDF text extraction
//! - Label-based field rules and product line item matching
//! - Batch processing of a directory of invoices
//! - Flattening of invoices into rows and XLSX/CSV/JSON export

pub mod batch;
pub mod error;
pub mod export;
pub mod invoice;
pub mod models;
pub mod pdf;

pub use batch::{BatchDriver, BatchObserver, BatchOptions, BatchReport, DocumentOutcome, FailurePolicy};
pub use error::{DocumentError, ExportError, InvxError, PdfError, Result};
pub use export::{ExportFormat, OutputRow, export, flatten};
pub use invoice::{ExtractionResult, InvoiceParser, LineItemScope, TemplateInvoiceParser};
pub use models::config::InvxConfig;
pub use models::invoice::{InvoiceField, InvoiceRecord, LineItem};
pub use pdf::{PdfExtractor, TextExtractor};
