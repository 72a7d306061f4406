//! Invoice field extraction module.

mod parser;
pub mod rules;

pub use parser::{ExtractionResult, InvoiceParser, TemplateInvoiceParser};
pub use rules::LineItemScope;
