//! Flattening of invoice records into rows and serialization of the table.

mod summary;
mod xlsx;

pub use summary::write_summary;
pub use xlsx::{SHEET_NAME, write_workbook};

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ExportError;
use crate::models::invoice::{InvoiceRecord, LineItem};

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Column headers, in output order.
pub const COLUMNS: [&str; 15] = [
    "Order ID",
    "Customer ID",
    "Order Date",
    "Contact Name",
    "Address",
    "City",
    "Postal Code",
    "Country",
    "Phone",
    "Fax",
    "Product ID",
    "Product Name",
    "Quantity",
    "Unit Price",
    "Total Price",
];

/// One exported row: invoice-level fields plus a single line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    pub order_id: Option<String>,
    pub customer_id: Option<String>,
    pub order_date: Option<String>,
    pub contact_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub product_id: String,
    pub product_name: String,
    pub quantity: String,
    pub unit_price: String,
    pub total_price: Option<String>,
}

impl OutputRow {
    pub fn new(record: &InvoiceRecord, item: &LineItem) -> Self {
        Self {
            order_id: record.order_id.clone(),
            customer_id: record.customer_id.clone(),
            order_date: record.order_date.clone(),
            contact_name: record.contact_name.clone(),
            address: record.address.clone(),
            city: record.city.clone(),
            postal_code: record.postal_code.clone(),
            country: record.country.clone(),
            phone: record.phone.clone(),
            fax: record.fax.clone(),
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            quantity: item.quantity.clone(),
            unit_price: item.unit_price.clone(),
            total_price: record.total_price.clone(),
        }
    }

    /// Cell values in [`COLUMNS`] order; `None` for absent fields.
    pub fn values(&self) -> [Option<&str>; 15] {
        [
            self.order_id.as_deref(),
            self.customer_id.as_deref(),
            self.order_date.as_deref(),
            self.contact_name.as_deref(),
            self.address.as_deref(),
            self.city.as_deref(),
            self.postal_code.as_deref(),
            self.country.as_deref(),
            self.phone.as_deref(),
            self.fax.as_deref(),
            Some(self.product_id.as_str()),
            Some(self.product_name.as_str()),
            Some(self.quantity.as_str()),
            Some(self.unit_price.as_str()),
            self.total_price.as_deref(),
        ]
    }
}

/// One row per (record, line item) pair, records first, then items.
///
/// Records without line items produce no rows.
pub fn flatten<'a, I>(records: I) -> Vec<OutputRow>
where
    I: IntoIterator<Item = &'a InvoiceRecord>,
{
    records
        .into_iter()
        .flat_map(|record| record.line_items.iter().map(move |item| OutputRow::new(record, item)))
        .collect()
}

/// Output file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Excel workbook.
    #[default]
    Xlsx,
    /// Comma-separated values.
    Csv,
    /// JSON array of rows.
    Json,
}

impl ExportFormat {
    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// Format whose extension is `name` (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        [ExportFormat::Xlsx, ExportFormat::Csv, ExportFormat::Json]
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(name))
    }

    /// Format named by the file extension of `path`.
    pub fn from_path(path: &Path) -> Option<Self> {
        Self::from_name(path.extension()?.to_str()?)
    }
}

/// Serialize rows to bytes in the given format.
pub fn render(rows: &[OutputRow], format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Xlsx => write_workbook(rows),
        ExportFormat::Csv => render_csv(rows),
        ExportFormat::Json => Ok(serde_json::to_vec_pretty(rows)?),
    }
}

/// Write rows to `path`, replacing any existing file.
///
/// The parent directory must already exist.
pub fn export(rows: &[OutputRow], path: &Path, format: ExportFormat) -> Result<()> {
    let data = render(rows, format)?;
    fs::write(path, data).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

fn render_csv(rows: &[OutputRow]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(COLUMNS)?;
    for row in rows {
        wtr.write_record(row.values().map(|v| v.unwrap_or_default()))?;
    }

    wtr.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}
