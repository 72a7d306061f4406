//! Minimal XLSX (SpreadsheetML) workbook writer.
//!
//! The workbook holds a single worksheet. Every value is a shared string and
//! absent values are left as empty cells. Archive timestamps are fixed so the
//! same rows always give the same bytes.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{Cursor, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{COLUMNS, OutputRow, Result};
use crate::error::ExportError;

/// Name of the worksheet holding the invoice rows.
pub const SHEET_NAME: &str = "Invoices";

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/></Relationships>"#;

/// Build a complete XLSX file in memory.
pub fn write_workbook(rows: &[OutputRow]) -> Result<Vec<u8>> {
    let mut strings = SharedStrings::default();
    let sheet = sheet_xml(rows, &mut strings)?;
    let shared = strings.to_xml()?;
    let workbook = workbook_xml()?;

    let parts: [(&str, &[u8]); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", ROOT_RELS.as_bytes()),
        ("xl/workbook.xml", workbook.as_slice()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes()),
        ("xl/worksheets/sheet1.xml", sheet.as_slice()),
        ("xl/sharedStrings.xml", shared.as_slice()),
    ];

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in parts {
        zip.start_file(name, options)?;
        zip.write_all(data)?;
    }

    Ok(zip.finish()?.into_inner())
}

/// Deduplicated string table referenced by index from cells.
#[derive(Default)]
struct SharedStrings {
    values: Vec<String>,
    index: HashMap<String, usize>,
    references: usize,
}

impl SharedStrings {
    fn intern(&mut self, value: &str) -> usize {
        self.references += 1;
        if let Some(&idx) = self.index.get(value) {
            return idx;
        }
        let idx = self.values.len();
        self.values.push(value.to_string());
        self.index.insert(value.to_string(), idx);
        idx
    }

    fn to_xml(&self) -> Result<Vec<u8>> {
        let mut xml = XmlWriter::new()?;
        xml.start(
            "sst",
            &[
                ("xmlns", MAIN_NS),
                ("count", self.references.to_string().as_str()),
                ("uniqueCount", self.values.len().to_string().as_str()),
            ],
        )?;
        for value in &self.values {
            xml.start("si", &[])?;
            if value.trim() != value.as_str() {
                xml.start("t", &[("xml:space", "preserve")])?;
            } else {
                xml.start("t", &[])?;
            }
            xml.text(value)?;
            xml.end("t")?;
            xml.end("si")?;
        }
        xml.end("sst")?;
        Ok(xml.finish())
    }
}

fn workbook_xml() -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new()?;
    xml.start(
        "workbook",
        &[
            ("xmlns", MAIN_NS),
            (
                "xmlns:r",
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
            ),
        ],
    )?;
    xml.start("sheets", &[])?;
    xml.empty(
        "sheet",
        &[("name", SHEET_NAME), ("sheetId", "1"), ("r:id", "rId1")],
    )?;
    xml.end("sheets")?;
    xml.end("workbook")?;
    Ok(xml.finish())
}

fn sheet_xml(rows: &[OutputRow], strings: &mut SharedStrings) -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new()?;
    xml.start("worksheet", &[("xmlns", MAIN_NS)])?;
    xml.start("sheetData", &[])?;

    let header: [Option<&str>; 15] = COLUMNS.map(Some);
    let body = rows.iter().map(|r| r.values());

    for (row_idx, values) in std::iter::once(header).chain(body).enumerate() {
        let row_number = (row_idx + 1).to_string();
        xml.start("row", &[("r", row_number.as_str())])?;

        for (col_idx, value) in values.iter().enumerate() {
            let Some(value) = value else {
                continue;
            };
            let cell_ref = format!("{}{}", column_name(col_idx), row_number);
            let string_idx = strings.intern(&xml_safe(value));

            xml.start("c", &[("r", cell_ref.as_str()), ("t", "s")])?;
            xml.start("v", &[])?;
            xml.text(&string_idx.to_string())?;
            xml.end("v")?;
            xml.end("c")?;
        }

        xml.end("row")?;
    }

    xml.end("sheetData")?;
    xml.end("worksheet")?;
    Ok(xml.finish())
}

/// Spreadsheet column letters for a zero-based index (0 -> A, 26 -> AA).
fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}

/// Drop characters that XML 1.0 does not allow (form feeds from page breaks, etc.).
fn xml_safe(value: &str) -> Cow<'_, str> {
    let allowed = |c: char| !c.is_control() || matches!(c, '\t' | '\n' | '\r');
    if value.chars().all(allowed) {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(value.chars().filter(|c| allowed(*c)).collect())
    }
}

fn xml_error(e: impl std::fmt::Display) -> ExportError {
    ExportError::Xml(e.to_string())
}

/// Thin wrapper over the quick-xml writer for element-only documents.
struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl XmlWriter {
    fn new() -> Result<Self> {
        let mut inner = Writer::new(Vec::new());
        inner
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(xml_error)?;
        Ok(Self { inner })
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.inner.write_event(Event::Start(elem)).map_err(xml_error)
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.inner.write_event(Event::Empty(elem)).map_err(xml_error)
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.inner
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_error)
    }

    fn text(&mut self, value: &str) -> Result<()> {
        self.inner
            .write_event(Event::Text(BytesText::new(value)))
            .map_err(xml_error)
    }

    fn finish(self) -> Vec<u8> {
        self.inner.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use calamine::{Reader, Xlsx, open_workbook};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::export::{ExportFormat, export, flatten};
    use crate::models::invoice::{InvoiceRecord, LineItem};

    fn sample_rows() -> Vec<OutputRow> {
        let records = vec![
            InvoiceRecord {
                order_id: Some("10248".to_string()),
                contact_name: Some("Paul Henriot".to_string()),
                address: Some("59 rue de l'Abbaye & Co <main>".to_string()),
                total_price: Some("440.00".to_string()),
                line_items: vec![
                    LineItem::new("11", "Queso Cabrales", "12", "14.00"),
                    LineItem::new("42", "Singaporean Hokkien Fried Mee", "10", "9.80"),
                ],
                ..Default::default()
            },
            InvoiceRecord {
                order_id: Some("10249".to_string()),
                line_items: vec![],
                ..Default::default()
            },
        ];
        flatten(&records)
    }

    fn read_back(path: &std::path::Path) -> Vec<Vec<String>> {
        let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_column_name() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(14), "O");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn test_xml_safe() {
        assert_eq!(xml_safe("Reims"), "Reims");
        assert_eq!(xml_safe("Reims\u{c}"), "Reims");
        assert_eq!(xml_safe("a\tb"), "a\tb");
    }

    #[test]
    fn test_workbook_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoices.xlsx");
        export(&sample_rows(), &path, ExportFormat::Xlsx).unwrap();

        let rows = read_back(&path);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], COLUMNS.iter().map(|c| c.to_string()).collect::<Vec<_>>());

        assert_eq!(rows[1][0], "10248");
        assert_eq!(rows[1][1], "");
        assert_eq!(rows[1][3], "Paul Henriot");
        assert_eq!(rows[1][4], "59 rue de l'Abbaye & Co <main>");
        assert_eq!(rows[1][10], "11");
        assert_eq!(rows[1][11], "Queso Cabrales");
        assert_eq!(rows[1][14], "440.00");
        assert_eq!(rows[2][11], "Singaporean Hokkien Fried Mee");
        assert_eq!(rows[2][13], "9.80");
    }

    #[test]
    fn test_header_only_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        export(&[], &path, ExportFormat::Xlsx).unwrap();

        let rows = read_back(&path);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "Order ID");
        assert_eq!(rows[0][14], "Total Price");
    }

    #[test]
    fn test_output_is_deterministic() {
        let rows = sample_rows();
        assert_eq!(write_workbook(&rows).unwrap(), write_workbook(&rows).unwrap());
    }

    #[test]
    fn test_shared_strings_are_deduplicated() {
        let mut strings = SharedStrings::default();
        assert_eq!(strings.intern("1"), 0);
        assert_eq!(strings.intern("2"), 1);
        assert_eq!(strings.intern("1"), 0);
        assert_eq!(strings.values.len(), 2);
        assert_eq!(strings.references, 3);
    }
}
