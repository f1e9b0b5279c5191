//! One extract-and-load pass over the invoice directory.
//!
//! Steps run in a fixed order: dump PDFs to text, split and extract, write
//! both CSVs, read them back, load. Each step is also usable on its own.

use std::fs;

use tracing::info;

use crate::csv_io::{read_general_csv, read_items_csv, write_general_csv, write_items_csv};
use crate::error::{FacturasError, Result};
use crate::invoice::{ExtractionResult, InvoiceParser};
use crate::loader::{LoadReport, load};
use crate::models::config::FacturasConfig;
use crate::pdf::{DumpEntry, DumpOutcome, write_text_dump};
use crate::storage::InvoiceStore;

/// What a full pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub dump: DumpOutcome,
    pub invoice_rows: usize,
    pub charge_rows: usize,
    pub load: LoadReport,
}

/// Write the text dump of the configured invoice directory.
pub fn dump_pdfs(
    config: &FacturasConfig,
    on_document: impl FnMut(&DumpEntry),
) -> Result<DumpOutcome> {
    write_text_dump(&config.paths.invoice_dir, &config.paths.text_dump, on_document)
}

/// Extract the text dump into both CSV tables.
pub fn extract_dump(config: &FacturasConfig) -> Result<ExtractionResult> {
    let dump_path = config.paths.text_dump_path();
    if !dump_path.is_file() {
        return Err(FacturasError::input_missing(dump_path));
    }
    let dump = fs::read_to_string(&dump_path)?;

    let result = InvoiceParser::from_config(&config.extraction).parse_dump(&dump);
    write_general_csv(&config.paths.general_csv_path(), &result.invoices)?;
    write_items_csv(&config.paths.items_csv_path(), &result.charges)?;
    Ok(result)
}

/// Load both CSV tables into `store`.
pub fn load_tables<S: InvoiceStore + ?Sized>(
    config: &FacturasConfig,
    store: &S,
) -> Result<LoadReport> {
    let invoices = read_general_csv(&config.paths.general_csv_path())?;
    let charges = read_items_csv(&config.paths.items_csv_path())?;
    load(store, &invoices, &charges, &config.extraction)
}

/// Run every step once.
pub fn run_pass<S: InvoiceStore + ?Sized>(
    config: &FacturasConfig,
    store: &S,
    on_document: impl FnMut(&DumpEntry),
) -> Result<PassReport> {
    let dump = dump_pdfs(config, on_document)?;
    let extracted = extract_dump(config)?;
    let load = load_tables(config, store)?;

    info!(
        documents = dump.documents,
        inserted = load.invoices.inserted,
        existing = load.invoices.existing,
        "pass complete"
    );
    Ok(PassReport {
        dump,
        invoice_rows: extracted.invoices.len(),
        charge_rows: extracted.charges.len(),
        load,
    })
}
