//! Persistent invoice storage.
//!
//! The loader only talks to [`InvoiceStore`]. The bulk [`InvoiceStore::existing_keys`]
//! read is part of the contract: the loader calls it once per run instead of
//! looking keys up row by row.

mod sqlite;

pub use sqlite::SqliteStore;

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::Result;

/// An invoice row ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    /// Normalized file name key.
    pub key: String,
    /// File name the row was extracted from.
    pub source_filename: String,
    pub payer_name: String,
    pub date: Option<NaiveDate>,
    pub gas_amount: String,
    pub credit_amount: String,
    pub total_amount: String,
    pub consumption_m3: String,
}

/// A stored invoice row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredInvoice {
    pub id: i64,
    pub key: String,
    /// Empty for rows stored before file names were recorded.
    pub source_filename: String,
    pub payer_name: String,
    pub date: Option<NaiveDate>,
    pub gas_amount: String,
    pub credit_amount: String,
    pub total_amount: String,
    pub consumption_m3: String,
}

/// A stored charge line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredChargeLine {
    pub id: i64,
    pub invoice_id: i64,
    pub concept: String,
    pub amount_to_pay: String,
}

/// Row counts of both relations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub invoices: usize,
    pub charge_lines: usize,
}

/// Storage operations used by the loader and the browsing commands.
///
/// Implementations assume a single writer. Two loaders running against the
/// same store can both miss a key in [`existing_keys`](Self::existing_keys)
/// and insert it twice.
pub trait InvoiceStore {
    /// Every stored invoice key with the file name that stored it, in one read.
    fn existing_keys(&self) -> Result<HashMap<String, String>>;

    /// Insert an invoice and return its identifier.
    fn insert_invoice(&self, invoice: &NewInvoice) -> Result<i64>;

    /// Identifier of the invoice stored under `key`.
    fn find_invoice_id(&self, key: &str) -> Result<Option<i64>>;

    /// Whether `invoice_id` already has a line with this concept and amount.
    fn charge_line_exists(&self, invoice_id: i64, concept: &str, amount: &str) -> Result<bool>;

    /// Insert a charge line and return its identifier.
    fn insert_charge_line(&self, invoice_id: i64, concept: &str, amount: &str) -> Result<i64>;

    fn counts(&self) -> Result<StoreCounts>;

    /// Stored invoices, newest date first.
    fn list_invoices(&self) -> Result<Vec<StoredInvoice>>;

    /// Charge lines of one invoice, in insertion order.
    fn list_charge_lines(&self, invoice_id: i64) -> Result<Vec<StoredChargeLine>>;
}
