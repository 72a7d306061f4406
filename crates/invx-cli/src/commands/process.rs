//! Process command - extract data from a single invoice file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::{debug, info};

use invx_core::batch::{PDF_SUFFIX, is_pdf_name};
use invx_core::invoice::{ExtractionResult, InvoiceParser, TemplateInvoiceParser};
use invx_core::models::invoice::{InvoiceField, InvoiceRecord};
use invx_core::pdf::{PdfExtractor, TextExtractor};

use super::config::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file (name ending in `.pdf`)
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// List the fields that could not be extracted
    #[arg(long)]
    show_missing: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    if !is_pdf_name(&args.input) {
        anyhow::bail!(
            "Unsupported file: {} (expected a name ending in {})",
            args.input.display(),
            PDF_SUFFIX
        );
    }

    info!("Processing file: {}", args.input.display());

    let data = fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let text = PdfExtractor::new()
        .extract_text(&data)
        .with_context(|| format!("Failed to extract text from {}", args.input.display()))?;

    let parser =
        TemplateInvoiceParser::new().with_line_item_scope(config.extraction.line_item_scope());
    let result = parser.parse(&text);

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&result.record)?,
        OutputFormat::Text => format_text(&result.record),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_missing {
        print_missing(&result);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn print_missing(result: &ExtractionResult) {
    let warnings = result.warnings();
    println!();
    if warnings.is_empty() {
        println!("{} All fields extracted", style("ℹ").blue());
        return;
    }
    eprintln!("{}", style("Missing:").yellow());
    for warning in warnings {
        eprintln!("  - {}", warning);
    }
}

fn format_text(record: &InvoiceRecord) -> String {
    let mut output = String::new();

    for field in InvoiceField::ALL {
        if field == InvoiceField::TotalPrice {
            continue;
        }
        output.push_str(&format!(
            "{:<14}{}\n",
            format!("{}:", field.label()),
            record.field(field).unwrap_or("-")
        ));
    }
    output.push('\n');

    output.push_str("Products:\n");
    if record.line_items.is_empty() {
        output.push_str("  (none)\n");
    }
    for item in &record.line_items {
        output.push_str(&format!(
            "  {:>4}  {}  x{} @ {}\n",
            item.product_id, item.product_name, item.quantity, item.unit_price
        ));
    }
    output.push('\n');

    output.push_str(&format!(
        "Total Price:  {}\n",
        record.total_price.as_deref().unwrap_or("-")
    ));

    output
}
