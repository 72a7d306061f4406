//! Invoice data models for fixed-template order invoices.

use serde::{Deserialize, Serialize};

/// Structured data extracted from one invoice document.
///
/// Every scalar is optional. `None` means the field's label was not found in
/// the document text, which is distinct from a present but empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Numeric order identifier.
    pub order_id: Option<String>,

    /// Alphanumeric customer identifier.
    pub customer_id: Option<String>,

    /// Order date as printed (not validated).
    pub order_date: Option<String>,

    /// Customer contact name.
    pub contact_name: Option<String>,

    /// Street address.
    pub address: Option<String>,

    /// City name.
    pub city: Option<String>,

    /// Postal code in `DDDDD-DDD` form.
    pub postal_code: Option<String>,

    /// Country name.
    pub country: Option<String>,

    /// Phone number as printed.
    pub phone: Option<String>,

    /// Fax number as printed.
    pub fax: Option<String>,

    /// Invoice total as printed.
    pub total_price: Option<String>,

    /// Product rows in order of first appearance.
    pub line_items: Vec<LineItem>,
}

/// A single product row on the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product identifier.
    pub product_id: String,

    /// Product name.
    pub product_name: String,

    /// Ordered quantity.
    pub quantity: String,

    /// Price per unit.
    pub unit_price: String,
}

impl LineItem {
    pub fn new(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        quantity: impl Into<String>,
        unit_price: impl Into<String>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            quantity: quantity.into(),
            unit_price: unit_price.into(),
        }
    }
}

/// Scalar fields of an [`InvoiceRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceField {
    OrderId,
    CustomerId,
    OrderDate,
    ContactName,
    Address,
    City,
    PostalCode,
    Country,
    Phone,
    Fax,
    TotalPrice,
}

impl InvoiceField {
    /// All scalar fields in export column order.
    pub const ALL: [InvoiceField; 11] = [
        InvoiceField::OrderId,
        InvoiceField::CustomerId,
        InvoiceField::OrderDate,
        InvoiceField::ContactName,
        InvoiceField::Address,
        InvoiceField::City,
        InvoiceField::PostalCode,
        InvoiceField::Country,
        InvoiceField::Phone,
        InvoiceField::Fax,
        InvoiceField::TotalPrice,
    ];

    /// Human-readable label, as used in export headers.
    pub fn label(&self) -> &'static str {
        match self {
            InvoiceField::OrderId => "Order ID",
            InvoiceField::CustomerId => "Customer ID",
            InvoiceField::OrderDate => "Order Date",
            InvoiceField::ContactName => "Contact Name",
            InvoiceField::Address => "Address",
            InvoiceField::City => "City",
            InvoiceField::PostalCode => "Postal Code",
            InvoiceField::Country => "Country",
            InvoiceField::Phone => "Phone",
            InvoiceField::Fax => "Fax",
            InvoiceField::TotalPrice => "Total Price",
        }
    }
}

impl std::fmt::Display for InvoiceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl InvoiceRecord {
    /// Get the value of a scalar field.
    pub fn field(&self, field: InvoiceField) -> Option<&str> {
        let value = match field {
            InvoiceField::OrderId => &self.order_id,
            InvoiceField::CustomerId => &self.customer_id,
            InvoiceField::OrderDate => &self.order_date,
            InvoiceField::ContactName => &self.contact_name,
            InvoiceField::Address => &self.address,
            InvoiceField::City => &self.city,
            InvoiceField::PostalCode => &self.postal_code,
            InvoiceField::Country => &self.country,
            InvoiceField::Phone => &self.phone,
            InvoiceField::Fax => &self.fax,
            InvoiceField::TotalPrice => &self.total_price,
        };
        value.as_deref()
    }

    /// Scalar fields that were not found in the source text.
    pub fn missing_fields(&self) -> Vec<InvoiceField> {
        InvoiceField::ALL
            .into_iter()
            .filter(|f| self.field(*f).is_none())
            .collect()
    }

    /// Check if nothing at all was extracted.
    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty() && InvoiceField::ALL.iter().all(|f| self.field(*f).is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_is_empty() {
        let record = InvoiceRecord::default();
        assert!(record.is_empty());
        assert_eq!(record.missing_fields().len(), InvoiceField::ALL.len());
    }

    #[test]
    fn test_absent_serializes_as_null() {
        let record = InvoiceRecord {
            order_id: Some("42".to_string()),
            city: Some(String::new()),
            ..Default::default()
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["order_id"], "42");
        assert_eq!(json["city"], "");
        assert!(json["country"].is_null());
    }

    #[test]
    fn test_field_lookup() {
        let record = InvoiceRecord {
            postal_code: Some("12345-678".to_string()),
            ..Default::default()
        };

        assert_eq!(record.field(InvoiceField::PostalCode), Some("12345-678"));
        assert_eq!(record.field(InvoiceField::Fax), None);
        assert!(!record.missing_fields().contains(&InvoiceField::PostalCode));
        assert_eq!(InvoiceField::TotalPrice.to_string(), "Total Price");
    }
}
