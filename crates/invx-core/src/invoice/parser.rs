//! Template invoice parser built from label and line item rules.

use std::time::Instant;

use tracing::{debug, trace};

use crate::models::invoice::*;

use super::rules::{LabelRule, LineItemExtractor, LineItemScope};

/// Result of invoice extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted invoice data.
    pub record: InvoiceRecord,
    /// Scalar fields whose label was not found.
    pub missing_fields: Vec<InvoiceField>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    /// Human-readable warnings for the missing fields.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings: Vec<String> = self
            .missing_fields
            .iter()
            .map(|f| format!("Could not extract {}", f))
            .collect();
        if self.record.line_items.is_empty() {
            warnings.push("Could not extract line items".to_string());
        }
        warnings
    }
}

/// Trait for invoice parsing.
///
/// Parsing never fails: anything that cannot be found is left absent.
pub trait InvoiceParser {
    /// Parse invoice from text.
    fn parse(&self, text: &str) -> ExtractionResult;
}

/// Parser for the fixed "Order ID / Customer ID / ... / TotalPrice" template.
pub struct TemplateInvoiceParser {
    rules: Vec<LabelRule>,
    line_items: LineItemExtractor,
}

impl TemplateInvoiceParser {
    /// Create a parser that searches the whole text for product rows.
    pub fn new() -> Self {
        Self {
            rules: InvoiceField::ALL.into_iter().map(LabelRule::for_field).collect(),
            line_items: LineItemExtractor::new(),
        }
    }

    /// Set where product rows are searched for.
    pub fn with_line_item_scope(mut self, scope: LineItemScope) -> Self {
        self.line_items = self.line_items.with_scope(scope);
        self
    }

    fn extract_scalar(&self, text: &str, field: InvoiceField) -> Option<String> {
        let rule = self.rules.iter().find(|r| r.field() == field)?;
        match rule.extract(text) {
            Some(m) => {
                trace!("{} = {:?} at {:?}", field, m.value, m.position);
                Some(m.value)
            }
            None => {
                debug!("No value for {}", field);
                None
            }
        }
    }
}

impl Default for TemplateInvoiceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceParser for TemplateInvoiceParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();

        debug!("Parsing invoice from {} characters of text", text.len());

        let line_items: Vec<LineItem> = self
            .line_items
            .extract_all(text)
            .into_iter()
            .map(|m| {
                trace!("Line item {:?} at {:?}", m.value, m.position);
                m.value
            })
            .collect();

        let record = InvoiceRecord {
            order_id: self.extract_scalar(text, InvoiceField::OrderId),
            customer_id: self.extract_scalar(text, InvoiceField::CustomerId),
            order_date: self.extract_scalar(text, InvoiceField::OrderDate),
            contact_name: self.extract_scalar(text, InvoiceField::ContactName),
            address: self.extract_scalar(text, InvoiceField::Address),
            city: self.extract_scalar(text, InvoiceField::City),
            postal_code: self.extract_scalar(text, InvoiceField::PostalCode),
            country: self.extract_scalar(text, InvoiceField::Country),
            phone: self.extract_scalar(text, InvoiceField::Phone),
            fax: self.extract_scalar(text, InvoiceField::Fax),
            total_price: self.extract_scalar(text, InvoiceField::TotalPrice),
            line_items,
        };

        let missing_fields = record.missing_fields();

        debug!(
            "Extracted order {:?} with {} line items, {} fields missing",
            record.order_id,
            record.line_items.len(),
            missing_fields.len()
        );

        ExtractionResult {
            record,
            missing_fields,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}
