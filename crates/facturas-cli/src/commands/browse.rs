//! Read-only commands: key collisions, stored invoices and counts.

use clap::Args;
use console::style;

use facturas_core::csv_io::read_general_csv;
use facturas_core::loader::{collisions, normalize_key};
use facturas_core::pdf::list_pdfs;
use facturas_core::storage::{InvoiceStore, StoredInvoice};

use super::{Context, open_store};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text summary
    Text,
    /// JSON output
    Json,
}

/// Arguments for the keys command.
#[derive(Args)]
pub struct KeysArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Also print each invoice's charge lines
    #[arg(long)]
    details: bool,

    /// Show at most this many invoices
    #[arg(short = 'n', long)]
    limit: Option<usize>,
}

pub fn keys(args: KeysArgs, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let rows = read_general_csv(&config.paths.general_csv_path())?;
    let report = collisions(rows.iter().map(|r| r.filename.as_str()));

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            let distinct: std::collections::HashSet<String> =
                rows.iter().map(|r| normalize_key(&r.filename)).collect();
            println!(
                "{} {} rows, {} distinct keys",
                style("ℹ").blue(),
                rows.len(),
                distinct.len()
            );
            if report.is_empty() {
                println!("{} No key collisions", style("✓").green());
            }
            for collision in &report {
                println!(
                    "{} '{}' -> {} files",
                    style("⚠").yellow(),
                    collision.key,
                    collision.filenames.len()
                );
                for filename in &collision.filenames {
                    println!("    - {}", filename);
                }
            }
        }
    }
    Ok(())
}

fn print_invoice(invoice: &StoredInvoice) {
    let date = invoice
        .date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:>5}  {:<8}  {:<10}  {:<24}  total {:>10}  gas {:>10}  credito {:>8}  {:>5} m3",
        invoice.id,
        invoice.key,
        date,
        invoice.payer_name,
        invoice.total_amount,
        invoice.gas_amount,
        invoice.credit_amount,
        invoice.consumption_m3
    );
}

pub fn list(args: ListArgs, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let store = open_store(&config)?;
    let mut invoices = store.list_invoices()?;
    if let Some(limit) = args.limit {
        invoices.truncate(limit);
    }

    match args.format {
        OutputFormat::Json => {
            let mut values = Vec::with_capacity(invoices.len());
            for invoice in &invoices {
                let mut value = serde_json::to_value(invoice)?;
                if args.details {
                    value["charge_lines"] =
                        serde_json::to_value(store.list_charge_lines(invoice.id)?)?;
                }
                values.push(value);
            }
            println!("{}", serde_json::to_string_pretty(&values)?);
        }
        OutputFormat::Text => {
            if invoices.is_empty() {
                println!("{} No stored invoices", style("ℹ").blue());
            }
            for invoice in &invoices {
                print_invoice(invoice);
                if args.details {
                    for line in store.list_charge_lines(invoice.id)? {
                        println!("         {:<40} {:>10}", line.concept, line.amount_to_pay);
                    }
                }
            }
        }
    }
    Ok(())
}

pub fn status(ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let store = open_store(&config)?;
    let counts = store.counts()?;

    println!("Database: {}", config.storage.database.display());
    println!("  Invoices:     {}", style(counts.invoices).bold());
    println!("  Charge lines: {}", style(counts.charge_lines).bold());

    println!("Invoice directory: {}", config.paths.invoice_dir.display());
    match list_pdfs(&config.paths.invoice_dir) {
        Ok(pdfs) => println!("  PDFs: {}", pdfs.len()),
        Err(_) => println!("  Status: {}", style("not found").yellow()),
    }
    for path in [
        config.paths.text_dump_path(),
        config.paths.general_csv_path(),
        config.paths.items_csv_path(),
    ] {
        let state = if path.is_file() {
            style("present").green()
        } else {
            style("missing").yellow()
        };
        println!("  {}: {}", path.display(), state);
    }
    Ok(())
}
