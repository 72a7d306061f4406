//! Label-prefixed scalar field rules.

use regex::Regex;

use super::ExtractionMatch;
use super::patterns::*;
use crate::models::invoice::InvoiceField;

/// A rule capturing the value that follows a literal label.
pub struct LabelRule {
    field: InvoiceField,
    pattern: &'static Regex,
}

impl LabelRule {
    /// Rule for a scalar invoice field.
    pub fn for_field(field: InvoiceField) -> Self {
        let pattern: &'static Regex = match field {
            InvoiceField::OrderId => &*ORDER_ID,
            InvoiceField::CustomerId => &*CUSTOMER_ID,
            InvoiceField::OrderDate => &*ORDER_DATE,
            InvoiceField::ContactName => &*CONTACT_NAME,
            InvoiceField::Address => &*ADDRESS,
            InvoiceField::City => &*CITY,
            InvoiceField::PostalCode => &*POSTAL_CODE,
            InvoiceField::Country => &*COUNTRY,
            InvoiceField::Phone => &*PHONE,
            InvoiceField::Fax => &*FAX,
            InvoiceField::TotalPrice => &*TOTAL_PRICE,
        };
        Self { field, pattern }
    }

    /// Field this rule extracts.
    pub fn field(&self) -> InvoiceField {
        self.field
    }

    /// First occurrence of the label and its value.
    pub fn extract(&self, text: &str) -> Option<ExtractionMatch<String>> {
        self.pattern.captures(text).map(|caps| {
            let full_match = caps.get(0).unwrap();
            ExtractionMatch::new(caps[1].to_string(), full_match.start(), full_match.end())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(text: &str, field: InvoiceField) -> Option<String> {
        LabelRule::for_field(field).extract(text).map(|m| m.value)
    }

    #[test]
    fn test_first_match_wins() {
        let text = "Order ID: 10248\nOrder ID: 10249";
        let m = LabelRule::for_field(InvoiceField::OrderId).extract(text).unwrap();
        assert_eq!(m.value, "10248");
        assert_eq!(m.position, (0, 15));
    }

    #[test]
    fn test_position_covers_label() {
        let text = "xx Customer ID: VINET";
        let m = LabelRule::for_field(InvoiceField::CustomerId).extract(text).unwrap();
        assert_eq!(m.value, "VINET");
        assert_eq!(m.position, (3, text.len()));
    }

    #[test]
    fn test_value_may_follow_line_break() {
        let text = "Contact Name:\nPaul Henriot";
        assert_eq!(
            value(text, InvoiceField::ContactName),
            Some("Paul Henriot".to_string())
        );
    }

    #[test]
    fn test_order_date_keeps_hyphens() {
        assert_eq!(
            value("Order Date: 2016-07-04", InvoiceField::OrderDate),
            Some("2016-07-04".to_string())
        );
    }

    #[test]
    fn test_missing_label() {
        assert_eq!(value("nothing here", InvoiceField::Fax), None);
    }
}
