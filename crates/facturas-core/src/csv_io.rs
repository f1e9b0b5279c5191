//! The two intermediate CSV tables.
//!
//! Column names come from the serde renames on [`InvoiceRecord`] and
//! [`ChargeLine`]. The header row is written even when there are no rows.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{FacturasError, Result};
use crate::models::invoice::{ChargeLine, InvoiceRecord};

/// Header of the invoice-level table.
pub const GENERAL_HEADER: [&str; 7] = [
    "filename",
    "Nombre",
    "Fecha",
    "Gas",
    "credito",
    "Total",
    "Consumo_m3",
];

/// Header of the itemized table.
pub const ITEMS_HEADER: [&str; 4] = ["filename", "ID", "Concepto", "ValorPagar"];

fn write_rows<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.is_file() {
        return Err(FacturasError::input_missing(path));
    }
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<std::result::Result<Vec<T>, _>>()?;
    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn write_general_csv(path: &Path, rows: &[InvoiceRecord]) -> Result<()> {
    write_rows(path, &GENERAL_HEADER, rows)
}

pub fn write_items_csv(path: &Path, rows: &[ChargeLine]) -> Result<()> {
    write_rows(path, &ITEMS_HEADER, rows)
}

pub fn read_general_csv(path: &Path) -> Result<Vec<InvoiceRecord>> {
    read_rows(path)
}

pub fn read_items_csv(path: &Path) -> Result<Vec<ChargeLine>> {
    read_rows(path)
}
