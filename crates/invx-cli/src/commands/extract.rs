//! Extract command - consolidate a directory of invoices into one table.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use invx_core::batch::{BatchDriver, BatchObserver, BatchReport, DocumentOutcome};
use invx_core::export::{self, ExportFormat, write_summary};
use invx_core::invoice::TemplateInvoiceParser;
use invx_core::models::config::InvxConfig;
use invx_core::pdf::PdfExtractor;
use invx_core::InvxError;

use super::config::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Directory containing invoice PDFs (default: from config)
    input: Option<PathBuf>,

    /// Output file (default: from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<TableFormat>,

    /// Stop at the first document that cannot be read
    #[arg(long)]
    fail_fast: bool,

    /// Only match product rows after this marker
    #[arg(long)]
    section_start: Option<String>,

    /// Stop matching product rows at this marker
    #[arg(long, requires = "section_start")]
    section_end: Option<String>,

    /// Also write a per-document summary CSV next to the output
    #[arg(long)]
    summary: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum TableFormat {
    /// Excel workbook
    Xlsx,
    /// CSV file
    Csv,
    /// JSON array of rows
    Json,
}

impl From<TableFormat> for ExportFormat {
    fn from(format: TableFormat) -> Self {
        match format {
            TableFormat::Xlsx => ExportFormat::Xlsx,
            TableFormat::Csv => ExportFormat::Csv,
            TableFormat::Json => ExportFormat::Json,
        }
    }
}

/// Progress bar driven by batch events.
struct ProgressObserver {
    pb: ProgressBar,
}

impl ProgressObserver {
    fn new() -> anyhow::Result<Self> {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
                .progress_chars("=>-"),
        );
        Ok(Self { pb })
    }
}

impl BatchObserver for ProgressObserver {
    fn on_start(&self, total: usize) {
        self.pb.set_length(total as u64);
    }

    fn on_document(&self, outcome: &DocumentOutcome) {
        self.pb.set_message(outcome.file_name());
        self.pb.inc(1);
    }

    fn on_finish(&self, _report: &BatchReport) {
        self.pb.finish_with_message("Complete");
    }
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, &args)?;

    let input_dir = config.input.directory.clone();
    let output_path = config.output.path.clone();
    let format = config.output.format;

    if !input_dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", input_dir.display());
    }

    let parser =
        TemplateInvoiceParser::new().with_line_item_scope(config.extraction.line_item_scope());
    let driver = BatchDriver::new(PdfExtractor::new(), parser).with_options(config.batch.options());

    debug!(
        "Extracting {} -> {} ({:?})",
        input_dir.display(),
        output_path.display(),
        format
    );

    let observer = ProgressObserver::new()?;
    let report = match driver.run(&input_dir, &observer) {
        Ok(report) => report,
        Err(InvxError::Document(e)) => {
            observer.pb.abandon();
            anyhow::bail!("Processing failed: {}", e);
        }
        Err(e) => {
            observer.pb.abandon();
            return Err(e).with_context(|| format!("Failed to read {}", input_dir.display()));
        }
    };

    let rows = export::flatten(report.records());
    export::export(&rows, &output_path, format)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    println!(
        "{} Extracted invoice data saved to {}",
        style("✓").green(),
        output_path.display()
    );

    if args.summary {
        let summary_path = summary_path(&output_path);
        write_summary(&summary_path, &report)
            .with_context(|| format!("Failed to write {}", summary_path.display()))?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    print_tally(&report, rows.len());

    Ok(())
}

/// Command line values take precedence over the configuration file.
///
/// Without `--format`, a known output extension selects the format.
fn apply_overrides(config: &mut InvxConfig, args: &ExtractArgs) -> anyhow::Result<()> {
    if let Some(ref input) = args.input {
        config.input.directory = input.clone();
    }
    if let Some(ref output) = args.output {
        config.output.path = output.clone();
    }

    let from_path = ExportFormat::from_path(&config.output.path);
    config.output.format = match (args.format.map(ExportFormat::from), from_path) {
        (Some(requested), Some(named)) if requested != named => {
            anyhow::bail!(
                "Output file {} does not match format {}",
                config.output.path.display(),
                requested.extension()
            );
        }
        (Some(requested), _) => requested,
        (None, Some(named)) => named,
        (None, None) => config.output.format,
    };

    if args.fail_fast {
        config.batch.continue_on_error = false;
    }
    if let Some(ref start) = args.section_start {
        config.extraction.section_start = Some(start.clone());
        config.extraction.section_end = args.section_end.clone();
    }

    Ok(())
}

/// `<output stem>_summary.csv` beside the output file.
fn summary_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "invoices".to_string());
    output.with_file_name(format!("{}_summary.csv", stem))
}

fn print_tally(report: &BatchReport, rows: usize) {
    println!();
    println!(
        "Processed {} files in {:.2}s (started {})",
        report.outcomes.len(),
        report.elapsed.as_secs_f64(),
        report.started_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "  {} {} successful ({} rows)",
        style("✓").green(),
        report.success_count(),
        rows
    );

    let failures = report.failures();
    if !failures.is_empty() {
        println!("  {} {} failed", style("✗").red(), failures.len());
        println!();
        println!("Failed files:");
        for outcome in failures {
            if let Err(ref e) = outcome.result {
                println!("  - {}: {}", outcome.file_name(), e.source);
            }
        }
    }
}
