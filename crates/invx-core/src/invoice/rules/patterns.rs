//! Regex patterns for the fixed invoice template.
//!
//! Labels are matched case-sensitively and may be followed by any amount of
//! whitespace, including line breaks, before the value.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Order information
    pub static ref ORDER_ID: Regex = Regex::new(r"Order ID:\s*(\d+)").unwrap();

    pub static ref CUSTOMER_ID: Regex = Regex::new(r"Customer ID:\s*(\w+)").unwrap();

    pub static ref ORDER_DATE: Regex = Regex::new(r"Order Date:\s*([\d-]+)").unwrap();

    // Customer details (value runs to the end of the line)
    pub static ref CONTACT_NAME: Regex = Regex::new(r"Contact Name:\s*(.+)").unwrap();

    pub static ref ADDRESS: Regex = Regex::new(r"Address:\s*(.+)").unwrap();

    pub static ref CITY: Regex = Regex::new(r"City:\s*(.+)").unwrap();

    pub static ref POSTAL_CODE: Regex = Regex::new(r"Postal Code:\s*(\d{5}-\d{3})").unwrap();

    pub static ref COUNTRY: Regex = Regex::new(r"Country:\s*(.+)").unwrap();

    pub static ref PHONE: Regex = Regex::new(r"Phone:\s*(.+)").unwrap();

    pub static ref FAX: Regex = Regex::new(r"Fax:\s*(.+)").unwrap();

    // Totals
    pub static ref TOTAL_PRICE: Regex = Regex::new(r"TotalPrice\s+(\d+(?:\.\d+)?)").unwrap();

    // Product rows: id, name, quantity, unit price
    pub static ref LINE_ITEM: Regex =
        Regex::new(r"(\d+)\s+(.+?)\s+(\d+)\s+(\d+(?:\.\d+)?)").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postal_code_is_strict() {
        assert!(!POSTAL_CODE.is_match("Postal Code: 1234-567"));
        assert!(!POSTAL_CODE.is_match("Postal Code: 12345-67"));
        assert_eq!(&POSTAL_CODE.captures("Postal Code: 12345-678").unwrap()[1], "12345-678");
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        assert!(!ORDER_ID.is_match("order id: 10248"));
        assert!(!TOTAL_PRICE.is_match("totalprice 10.00"));
        assert!(ORDER_ID.is_match("Order ID: 10248"));
    }

    #[test]
    fn test_rest_of_line_stops_at_newline() {
        let caps = CITY.captures("City: Rio de Janeiro\nCountry: Brazil").unwrap();
        assert_eq!(&caps[1], "Rio de Janeiro");
    }

    #[test]
    fn test_total_price_requires_whitespace() {
        assert_eq!(&TOTAL_PRICE.captures("TotalPrice 440.00").unwrap()[1], "440.00");
        assert_eq!(&TOTAL_PRICE.captures("TotalPrice\n59").unwrap()[1], "59");
        assert!(!TOTAL_PRICE.is_match("TotalPrice: 59.97"));
    }

    #[test]
    fn test_line_item_groups() {
        let caps = LINE_ITEM.captures("11 Queso Cabrales 12 14.00").unwrap();
        assert_eq!(&caps[1], "11");
        assert_eq!(&caps[2], "Queso Cabrales");
        assert_eq!(&caps[3], "12");
        assert_eq!(&caps[4], "14.00");
    }
}
