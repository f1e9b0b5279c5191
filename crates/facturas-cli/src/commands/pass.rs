//! Pipeline step commands: dump, extract, load and run.

use std::time::Instant;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use facturas_core::models::config::FacturasConfig;
use facturas_core::pdf::{DumpEntry, DumpOutcome, list_pdfs};
use facturas_core::pipeline::{self, PassReport};

use super::{Context, open_store, print_load_report};

fn dump_progress(config: &FacturasConfig) -> anyhow::Result<ProgressBar> {
    let total = list_pdfs(&config.paths.invoice_dir)?.len();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );
    Ok(pb)
}

fn on_document(pb: &ProgressBar) -> impl FnMut(&DumpEntry) + '_ {
    move |entry| {
        pb.set_message(entry.filename().to_string());
        pb.inc(1);
    }
}

fn print_dump(outcome: &DumpOutcome) {
    println!(
        "{} Dumped {} PDFs to {}",
        style("✓").green(),
        outcome.documents,
        outcome.path.display()
    );
    if outcome.empty > 0 || outcome.failed > 0 {
        println!(
            "{} {} without text, {} failed",
            style("⚠").yellow(),
            outcome.empty,
            outcome.failed
        );
    }
}

pub fn dump(ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let pb = dump_progress(&config)?;
    let outcome = pipeline::dump_pdfs(&config, on_document(&pb))?;
    pb.finish_and_clear();
    print_dump(&outcome);
    Ok(())
}

pub fn extract(ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let result = pipeline::extract_dump(&config)?;

    println!(
        "{} Extracted {} invoices and {} charge lines",
        style("✓").green(),
        result.invoices.len(),
        result.charges.len()
    );
    let incomplete = result
        .invoices
        .iter()
        .filter(|record| {
            let (filled, fields) = record.coverage();
            filled < fields
        })
        .count();
    if incomplete > 0 {
        println!(
            "{} {} of {} invoices have empty fields",
            style("⚠").yellow(),
            incomplete,
            result.invoices.len()
        );
    }
    println!("  {}", config.paths.general_csv_path().display());
    println!("  {}", config.paths.items_csv_path().display());
    Ok(())
}

pub fn load(ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let store = open_store(&config)?;
    let report = pipeline::load_tables(&config, &store)?;
    print_load_report(&report);
    Ok(())
}

/// One full pass; shared with the watch loop.
pub fn full_pass(config: &FacturasConfig) -> anyhow::Result<PassReport> {
    let store = open_store(config)?;
    let pb = dump_progress(config)?;
    let report = pipeline::run_pass(config, &store, on_document(&pb))?;
    pb.finish_and_clear();
    Ok(report)
}

pub fn print_pass(report: &PassReport) {
    print_dump(&report.dump);
    println!(
        "{} Extracted {} invoices and {} charge lines",
        style("✓").green(),
        report.invoice_rows,
        report.charge_rows
    );
    print_load_report(&report.load);
}

pub fn run(ctx: &Context) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = ctx.load_config()?;
    let report = full_pass(&config)?;

    print_pass(&report);
    println!();
    println!(
        "{} Pass finished in {:?}",
        style("✓").green(),
        start.elapsed()
    );
    Ok(())
}
