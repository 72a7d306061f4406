//! Batch processing of a directory of invoice PDFs.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::error::{DocumentError, InvxError, Result};
use crate::invoice::InvoiceParser;
use crate::models::invoice::InvoiceRecord;
use crate::pdf::TextExtractor;

/// File name suffix of processed documents (case-sensitive).
pub const PDF_SUFFIX: &str = ".pdf";

/// What to do when a document cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the failure and move on to the next document.
    #[default]
    Continue,
    /// Stop the batch and return the failure.
    Abort,
}

/// Batch driver options.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub failure_policy: FailurePolicy,
}

/// Result of processing a single document.
#[derive(Debug)]
pub struct DocumentOutcome {
    pub path: PathBuf,
    pub result: std::result::Result<InvoiceRecord, DocumentError>,
    pub processing_time_ms: u64,
}

impl DocumentOutcome {
    /// File name of the document, for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Progress callbacks. Observers never influence the batch result.
pub trait BatchObserver {
    /// Called once the documents to process are known.
    fn on_start(&self, _total: usize) {}

    /// Called after each document.
    fn on_document(&self, _outcome: &DocumentOutcome) {}

    /// Called when the batch ends without aborting.
    fn on_finish(&self, _report: &BatchReport) {}
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// All outcomes of a batch run, in processing order.
#[derive(Debug)]
pub struct BatchReport {
    pub outcomes: Vec<DocumentOutcome>,
    pub started_at: DateTime<Local>,
    pub elapsed: Duration,
}

impl BatchReport {
    /// Records of successfully processed documents, in processing order.
    pub fn records(&self) -> Vec<&InvoiceRecord> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok()).collect()
    }

    /// Owned records of successfully processed documents.
    pub fn into_records(self) -> Vec<InvoiceRecord> {
        self.outcomes.into_iter().filter_map(|o| o.result.ok()).collect()
    }

    /// Documents that could not be read.
    pub fn failures(&self) -> Vec<&DocumentOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success()).collect()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }
}

/// Whether the file name ends with [`PDF_SUFFIX`].
pub fn is_pdf_name(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().ends_with(PDF_SUFFIX))
        .unwrap_or(false)
}

/// List the PDF documents directly inside `dir`, sorted by file name.
pub fn list_documents(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_pdf_name(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Runs text extraction then field extraction over a directory.
pub struct BatchDriver<E, P> {
    extractor: E,
    parser: P,
    options: BatchOptions,
}

impl<E: TextExtractor, P: InvoiceParser> BatchDriver<E, P> {
    pub fn new(extractor: E, parser: P) -> Self {
        Self {
            extractor,
            parser,
            options: BatchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Process one document into a record.
    pub fn process_file(&self, path: &Path) -> std::result::Result<InvoiceRecord, DocumentError> {
        let data = fs::read(path).map_err(|e| DocumentError::new(path, e))?;
        let text = self
            .extractor
            .extract_text(&data)
            .map_err(|e| DocumentError::new(path, e))?;

        let result = self.parser.parse(&text);
        if result.record.is_empty() {
            warn!("No invoice fields recognized in {}", path.display());
        } else if result.record.line_items.is_empty() {
            warn!("No line items found in {}", path.display());
        }
        Ok(result.record)
    }

    /// Process every PDF in `dir`.
    ///
    /// Under [`FailurePolicy::Abort`] the first unreadable document ends the
    /// batch with [`InvxError::Document`].
    pub fn run(&self, dir: &Path, observer: &dyn BatchObserver) -> Result<BatchReport> {
        let started_at = Local::now();
        let start = Instant::now();

        let files = list_documents(dir)?;
        info!("Found {} PDF files in {}", files.len(), dir.display());
        observer.on_start(files.len());

        let mut outcomes = Vec::with_capacity(files.len());

        for path in files {
            let file_start = Instant::now();
            let result = self.process_file(&path);
            let processing_time_ms = file_start.elapsed().as_millis() as u64;

            let outcome = DocumentOutcome {
                path,
                result,
                processing_time_ms,
            };
            observer.on_document(&outcome);

            match outcome.result {
                Ok(ref record) => {
                    debug!(
                        "Processed {} (order {:?}) in {}ms",
                        outcome.path.display(),
                        record.order_id,
                        processing_time_ms
                    );
                    outcomes.push(outcome);
                }
                Err(e) if self.options.failure_policy == FailurePolicy::Abort => {
                    return Err(InvxError::Document(e));
                }
                Err(ref e) => {
                    warn!("Skipping document: {}", e);
                    outcomes.push(outcome);
                }
            }
        }

        let report = BatchReport {
            outcomes,
            started_at,
            elapsed: start.elapsed(),
        };

        info!(
            "Batch finished: {} successful, {} failed",
            report.success_count(),
            report.failure_count()
        );
        observer.on_finish(&report);

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::{DocumentErrorKind, PdfError};
    use crate::invoice::TemplateInvoiceParser;

    /// Treats file contents as already-extracted text.
    struct PlainText;

    impl TextExtractor for PlainText {
        fn extract_text(&self, data: &[u8]) -> crate::pdf::Result<String> {
            if data.starts_with(b"%CORRUPT") {
                return Err(PdfError::Parse("corrupt test document".to_string()));
            }
            Ok(String::from_utf8_lossy(data).into_owned())
        }
    }

    #[derive(Default)]
    struct Recorder {
        total: RefCell<Option<usize>>,
        seen: RefCell<Vec<String>>,
        finished: RefCell<bool>,
    }

    impl BatchObserver for Recorder {
        fn on_start(&self, total: usize) {
            *self.total.borrow_mut() = Some(total);
        }

        fn on_document(&self, outcome: &DocumentOutcome) {
            self.seen.borrow_mut().push(outcome.file_name());
        }

        fn on_finish(&self, _report: &BatchReport) {
            *self.finished.borrow_mut() = true;
        }
    }

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn driver() -> BatchDriver<PlainText, TemplateInvoiceParser> {
        BatchDriver::new(PlainText, TemplateInvoiceParser::new())
    }

    #[test]
    fn test_list_documents_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.pdf", "");
        write(dir.path(), "a.pdf", "");
        write(dir.path(), "C.PDF", "");
        write(dir.path(), "notes.txt", "");
        write(dir.path(), "archive.pdf.bak", "");
        fs::create_dir(dir.path().join("nested.pdf")).unwrap();
        write(&dir.path().join("nested.pdf"), "inner.pdf", "");

        let names: Vec<String> = list_documents(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
    }

    #[test]
    fn test_is_pdf_name() {
        assert!(is_pdf_name(Path::new("in/invoice.pdf")));
        assert!(!is_pdf_name(Path::new("in/invoice.PDF")));
        assert!(!is_pdf_name(Path::new("in/invoice.pdf.bak")));
        assert!(!is_pdf_name(Path::new("/")));
    }

    #[test]
    fn test_run_collects_records_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "2.pdf", "Order ID: 2\nProducts:\n5 Tofu 1 23.25\n");
        write(dir.path(), "1.pdf", "Order ID: 1\n");

        let recorder = Recorder::default();
        let report = driver().run(dir.path(), &recorder).unwrap();
        let records = report.records();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].order_id.as_deref(), Some("1"));
        assert!(records[0].line_items.is_empty());
        assert_eq!(records[1].order_id.as_deref(), Some("2"));
        assert_eq!(records[1].line_items.len(), 1);
        assert_eq!(records[1].line_items[0].product_name, "Tofu");

        assert_eq!(*recorder.total.borrow(), Some(2));
        assert_eq!(*recorder.seen.borrow(), vec!["1.pdf", "2.pdf"]);
        assert!(*recorder.finished.borrow());
    }

    #[test]
    fn test_continue_records_failures() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.pdf", "Order ID: 1\n");
        write(dir.path(), "b.pdf", "%CORRUPT");
        write(dir.path(), "c.pdf", "Order ID: 3\n");

        let report = driver().run(dir.path(), &NoopObserver).unwrap();

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failure_count(), 1);

        let failures = report.failures();
        assert_eq!(failures[0].file_name(), "b.pdf");
        let err = failures[0].result.as_ref().unwrap_err();
        assert!(matches!(err.source, DocumentErrorKind::Pdf(PdfError::Parse(_))));
        assert!(err.to_string().contains("b.pdf"));

        let records = report.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].order_id.as_deref(), Some("3"));
    }

    #[test]
    fn test_abort_stops_on_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.pdf", "%CORRUPT");
        write(dir.path(), "b.pdf", "Order ID: 2\n");

        let recorder = Recorder::default();
        let err = driver()
            .with_options(BatchOptions {
                failure_policy: FailurePolicy::Abort,
            })
            .run(dir.path(), &recorder)
            .unwrap_err();

        match err {
            InvxError::Document(e) => assert!(e.path.ends_with("a.pdf")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*recorder.seen.borrow(), vec!["a.pdf"]);
        assert!(!*recorder.finished.borrow());
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let report = driver().run(dir.path(), &NoopObserver).unwrap();
        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = driver()
            .run(&dir.path().join("does-not-exist"), &NoopObserver)
            .unwrap_err();
        assert!(matches!(err, InvxError::Io(_)));
    }
}
