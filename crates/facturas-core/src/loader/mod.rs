//! Incremental, idempotent loading of extracted rows into storage.
//!
//! A run reads every stored key once, then inserts only invoices whose key
//! is unseen and only charge lines whose `(invoice, concept, amount)` is
//! unseen. Re-running over the same rows inserts nothing.

mod key;

pub use key::{KEY_LENGTH, KeyCollision, collisions, normalize_key};

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::error::{Result, RowError};
use crate::invoice::rules::parse_dmy;
use crate::models::config::ExtractionConfig;
use crate::models::invoice::{ChargeLine, InvoiceRecord};
use crate::storage::{InvoiceStore, NewInvoice};

/// Invoice row outcomes of one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvoiceCounts {
    pub inserted: usize,
    /// Key already stored (or already inserted earlier in this batch).
    pub existing: usize,
    /// Row refused, see [`LoadReport::rejections`].
    pub rejected: usize,
    /// A different file name already owns this key, in storage or earlier in the batch.
    pub collisions: usize,
}

/// Charge line outcomes of one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChargeLineCounts {
    pub inserted: usize,
    pub existing: usize,
    /// No stored invoice to attach to.
    pub orphaned: usize,
    /// Blank concept text.
    pub blank: usize,
}

/// What a load did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub invoices: InvoiceCounts,
    pub charge_lines: ChargeLineCounts,
    pub rejections: Vec<RowError>,
}

/// Keep at most `words` whitespace-separated words of `name`.
pub fn truncate_name(name: &str, words: usize) -> String {
    name.split_whitespace()
        .take(words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Convert an extracted invoice row into a storable one.
///
/// An empty date is stored as absent; any other date must be `d/m/yyyy`.
pub fn prepare_invoice(
    record: &InvoiceRecord,
    name_words: usize,
) -> std::result::Result<NewInvoice, RowError> {
    let raw_date = record.date.trim();
    let date = if raw_date.is_empty() {
        None
    } else {
        Some(parse_dmy(raw_date).ok_or_else(|| RowError::Date {
            filename: record.filename.clone(),
            value: record.date.clone(),
        })?)
    };

    Ok(NewInvoice {
        key: normalize_key(&record.filename),
        source_filename: record.filename.clone(),
        payer_name: truncate_name(&record.payer_name, name_words),
        date,
        gas_amount: record.gas_amount.clone(),
        credit_amount: record.credit_amount.clone(),
        total_amount: record.total_amount.clone(),
        consumption_m3: record.consumption_m3.clone(),
    })
}

/// Reconcile extracted rows against `store`.
///
/// Storage errors abort the load. Bad rows, orphaned and blank charge lines
/// and key collisions are counted in the report instead.
pub fn load<S: InvoiceStore + ?Sized>(
    store: &S,
    invoices: &[InvoiceRecord],
    charges: &[ChargeLine],
    config: &ExtractionConfig,
) -> Result<LoadReport> {
    let mut report = LoadReport::default();
    // key -> file name that owns it, seeded from storage
    let mut owners = store.existing_keys()?;
    debug!("{} invoice keys already stored", owners.len());
    // keys whose invoice row exists, stored or inserted in this run
    let mut stored: HashSet<String> = owners.keys().cloned().collect();

    for record in invoices {
        if record.filename.trim().is_empty() {
            warn!("Rejected invoice row: {}", RowError::NoFilename);
            report.invoices.rejected += 1;
            report.rejections.push(RowError::NoFilename);
            continue;
        }
        let key = normalize_key(&record.filename);

        match owners.get_mut(&key) {
            // Rows from older databases carry no file name; the first claimant takes them.
            Some(owner) if owner.is_empty() => {
                owner.clone_from(&record.filename);
                report.invoices.existing += 1;
                continue;
            }
            Some(owner) if *owner == record.filename => {
                report.invoices.existing += 1;
                continue;
            }
            Some(owner) => {
                warn!(
                    "{} shares key {} with {}, skipping",
                    record.filename, key, owner
                );
                report.invoices.collisions += 1;
                continue;
            }
            None => {
                owners.insert(key.clone(), record.filename.clone());
            }
        }

        let invoice = match prepare_invoice(record, config.stored_name_words) {
            Ok(invoice) => invoice,
            Err(err) => {
                warn!("Rejected invoice row: {}", err);
                report.invoices.rejected += 1;
                report.rejections.push(err);
                continue;
            }
        };

        let id = store.insert_invoice(&invoice)?;
        debug!("Inserted invoice {} for {} ({})", id, key, invoice.payer_name);
        stored.insert(key);
        report.invoices.inserted += 1;
    }

    let mut ids: HashMap<String, i64> = HashMap::new();
    for charge in charges {
        let concept = charge.concept.trim();
        if concept.is_empty() {
            report.charge_lines.blank += 1;
            continue;
        }

        let key = normalize_key(&charge.filename);
        let owned = owners.get(&key).is_some_and(|owner| *owner == charge.filename);
        if !owned || !stored.contains(&key) {
            report.charge_lines.orphaned += 1;
            continue;
        }

        let invoice_id = match ids.get(&key) {
            Some(id) => *id,
            None => match store.find_invoice_id(&key)? {
                Some(id) => {
                    ids.insert(key.clone(), id);
                    id
                }
                None => {
                    report.charge_lines.orphaned += 1;
                    continue;
                }
            },
        };

        if store.charge_line_exists(invoice_id, concept, &charge.amount_to_pay)? {
            report.charge_lines.existing += 1;
        } else {
            store.insert_charge_line(invoice_id, concept, &charge.amount_to_pay)?;
            report.charge_lines.inserted += 1;
        }
    }

    if report.charge_lines.orphaned > 0 {
        warn!(
            "{} charge lines have no stored invoice",
            report.charge_lines.orphaned
        );
    }
    info!(
        inserted = report.invoices.inserted,
        existing = report.invoices.existing,
        rejected = report.invoices.rejected,
        collisions = report.invoices.collisions,
        "loaded invoices"
    );
    info!(
        inserted = report.charge_lines.inserted,
        existing = report.charge_lines.existing,
        orphaned = report.charge_lines.orphaned,
        blank = report.charge_lines.blank,
        "loaded charge lines"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;
    use pretty_assertions::assert_eq;

    fn record(filename: &str, name: &str, date: &str) -> InvoiceRecord {
        InvoiceRecord {
            filename: filename.to_string(),
            payer_name: name.to_string(),
            date: date.to_string(),
            gas_amount: "1000".to_string(),
            credit_amount: "200".to_string(),
            total_amount: "1200".to_string(),
            consumption_m3: "37".to_string(),
        }
    }

    fn charge(filename: &str, concept: &str, amount: &str) -> ChargeLine {
        ChargeLine {
            filename: filename.to_string(),
            concept_id: "100".to_string(),
            concept: concept.to_string(),
            amount_to_pay: amount.to_string(),
        }
    }

    fn sample() -> (Vec<InvoiceRecord>, Vec<ChargeLine>) {
        (
            vec![
                record("enero_0012345.pdf", "JUAN PEREZ GOMEZ", "01/02/2023"),
                record("febrero_0067890.pdf", "ANA ROJAS", "15/03/2023"),
            ],
            vec![
                charge("enero_0012345.pdf", "GAS", "1000"),
                charge("enero_0012345.pdf", "SUBSIDIO", "500"),
                charge("febrero_0067890.pdf", "GAS", "400"),
            ],
        )
    }

    #[test]
    fn test_first_load_inserts_everything() {
        let store = SqliteStore::open_in_memory().unwrap();
        let (invoices, charges) = sample();
        let report = load(&store, &invoices, &charges, &ExtractionConfig::default()).unwrap();

        assert_eq!(
            report.invoices,
            InvoiceCounts {
                inserted: 2,
                ..Default::default()
            }
        );
        assert_eq!(report.charge_lines.inserted, 3);

        let stored = store.list_invoices().unwrap();
        assert_eq!(stored[0].key, "0067890");
        assert_eq!(stored[1].payer_name, "JUAN PEREZ");
        assert_eq!(stored[1].date.unwrap().to_string(), "2023-02-01");
    }

    #[test]
    fn test_second_load_is_a_no_op() {
        let store = SqliteStore::open_in_memory().unwrap();
        let (invoices, charges) = sample();
        let config = ExtractionConfig::default();

        load(&store, &invoices, &charges, &config).unwrap();
        let after_first = store.counts().unwrap();
        let report = load(&store, &invoices, &charges, &config).unwrap();

        assert_eq!(store.counts().unwrap(), after_first);
        assert_eq!(report.invoices.inserted, 0);
        assert_eq!(report.invoices.existing, 2);
        assert_eq!(report.charge_lines.inserted, 0);
        assert_eq!(report.charge_lines.existing, 3);
    }

    #[test]
    fn test_already_stored_key_is_counted_as_existing() {
        let store = SqliteStore::open_in_memory().unwrap();
        let config = ExtractionConfig::default();
        let row = record("x_0012345.pdf", "A B", "");
        load(&store, &[row.clone()], &[], &config).unwrap();

        let report = load(&store, &[row], &[], &config).unwrap();
        assert_eq!(report.invoices.inserted, 0);
        assert_eq!(report.invoices.existing, 1);
        assert_eq!(report.invoices.collisions, 0);
    }

    #[test]
    fn test_stored_key_keeps_its_owner_across_runs() {
        let store = SqliteStore::open_in_memory().unwrap();
        let config = ExtractionConfig::default();
        load(
            &store,
            &[record("enero_0012345.pdf", "A B", "")],
            &[charge("enero_0012345.pdf", "GAS", "10")],
            &config,
        )
        .unwrap();

        let report = load(
            &store,
            &[
                record("abril_0012345.pdf", "C D", ""),
                record("enero_0012345.pdf", "A B", ""),
            ],
            &[
                charge("abril_0012345.pdf", "GAS", "999"),
                charge("enero_0012345.pdf", "GAS", "10"),
            ],
            &config,
        )
        .unwrap();

        assert_eq!(
            report.invoices,
            InvoiceCounts {
                existing: 1,
                collisions: 1,
                ..Default::default()
            }
        );
        assert_eq!(
            report.charge_lines,
            ChargeLineCounts {
                existing: 1,
                orphaned: 1,
                ..Default::default()
            }
        );

        let id = store.find_invoice_id("0012345").unwrap().unwrap();
        let amounts: Vec<String> = store
            .list_charge_lines(id)
            .unwrap()
            .into_iter()
            .map(|l| l.amount_to_pay)
            .collect();
        assert_eq!(amounts, vec!["10"]);
    }

    #[test]
    fn test_row_without_recorded_file_name_is_claimed_once() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut legacy = prepare_invoice(&record("old_0012345.pdf", "A B", ""), 2).unwrap();
        legacy.source_filename.clear();
        store.insert_invoice(&legacy).unwrap();

        let report = load(
            &store,
            &[
                record("enero_0012345.pdf", "A B", ""),
                record("abril_0012345.pdf", "C D", ""),
            ],
            &[
                charge("enero_0012345.pdf", "GAS", "10"),
                charge("abril_0012345.pdf", "GAS", "999"),
            ],
            &ExtractionConfig::default(),
        )
        .unwrap();

        assert_eq!(report.invoices.existing, 1);
        assert_eq!(report.invoices.collisions, 1);
        assert_eq!(report.charge_lines.inserted, 1);
        assert_eq!(report.charge_lines.orphaned, 1);
    }

    #[test]
    fn test_orphaned_charge_line_is_counted() {
        let store = SqliteStore::open_in_memory().unwrap();
        let report = load(
            &store,
            &[],
            &[charge("nadie_9999999.pdf", "GAS", "10")],
            &ExtractionConfig::default(),
        )
        .unwrap();

        assert_eq!(report.charge_lines.orphaned, 1);
        assert_eq!(store.counts().unwrap().charge_lines, 0);
    }

    #[test]
    fn test_blank_concepts_are_skipped() {
        let store = SqliteStore::open_in_memory().unwrap();
        let report = load(
            &store,
            &[record("a_0000001.pdf", "A B", "")],
            &[charge("a_0000001.pdf", "   ", "10")],
            &ExtractionConfig::default(),
        )
        .unwrap();
        assert_eq!(report.charge_lines.blank, 1);
        assert_eq!(report.charge_lines.inserted, 0);
    }

    #[test]
    fn test_bad_date_rejects_only_that_row() {
        let store = SqliteStore::open_in_memory().unwrap();
        let invoices = vec![
            record("a_0000001.pdf", "A B", "31/02/2023"),
            record("b_0000002.pdf", "C D", "01/03/2023"),
        ];
        let charges = vec![
            charge("a_0000001.pdf", "GAS", "10"),
            charge("b_0000002.pdf", "GAS", "20"),
        ];
        let report = load(&store, &invoices, &charges, &ExtractionConfig::default()).unwrap();

        assert_eq!(report.invoices.inserted, 1);
        assert_eq!(report.invoices.rejected, 1);
        assert_eq!(
            report.rejections,
            vec![RowError::Date {
                filename: "a_0000001.pdf".to_string(),
                value: "31/02/2023".to_string(),
            }]
        );
        assert_eq!(report.charge_lines.inserted, 1);
        assert_eq!(report.charge_lines.orphaned, 1);
    }

    #[test]
    fn test_empty_date_is_stored_as_absent() {
        let store = SqliteStore::open_in_memory().unwrap();
        load(
            &store,
            &[record("a_0000001.pdf", "A B", "")],
            &[],
            &ExtractionConfig::default(),
        )
        .unwrap();
        assert_eq!(store.list_invoices().unwrap()[0].date, None);
    }

    #[test]
    fn test_colliding_file_names_are_flagged_not_merged() {
        let store = SqliteStore::open_in_memory().unwrap();
        let invoices = vec![
            record("enero_0012345.pdf", "A B", ""),
            record("marzo_0012345.pdf", "C D", ""),
        ];
        let charges = vec![
            charge("enero_0012345.pdf", "GAS", "10"),
            charge("marzo_0012345.pdf", "GAS", "99"),
        ];
        let report = load(&store, &invoices, &charges, &ExtractionConfig::default()).unwrap();

        assert_eq!(report.invoices.inserted, 1);
        assert_eq!(report.invoices.collisions, 1);
        assert_eq!(report.charge_lines.inserted, 1);
        assert_eq!(report.charge_lines.orphaned, 1);
        assert_eq!(store.counts().unwrap().invoices, 1);
    }

    #[test]
    fn test_repeated_row_is_inserted_once() {
        let store = SqliteStore::open_in_memory().unwrap();
        let row = record("a_0000001.pdf", "A B", "");
        let report = load(
            &store,
            &[row.clone(), row],
            &[],
            &ExtractionConfig::default(),
        )
        .unwrap();
        assert_eq!(report.invoices.inserted, 1);
        assert_eq!(report.invoices.existing, 1);
    }

    #[test]
    fn test_unnamed_row_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let report = load(
            &store,
            &[InvoiceRecord::empty("")],
            &[],
            &ExtractionConfig::default(),
        )
        .unwrap();
        assert_eq!(report.invoices.rejected, 1);
        assert_eq!(report.rejections, vec![RowError::NoFilename]);
        assert_eq!(store.counts().unwrap().invoices, 0);
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("JUAN  PEREZ GOMEZ", 2), "JUAN PEREZ");
        assert_eq!(truncate_name("ANA", 2), "ANA");
        assert_eq!(truncate_name("", 2), "");
    }
}
