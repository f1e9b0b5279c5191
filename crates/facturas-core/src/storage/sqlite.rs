//! SQLite implementation of [`InvoiceStore`].
//!
//! Amounts are TEXT digit strings. Whether their last two digits are cents
//! is not known, so no decimal scale is applied on the way in.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};

use super::{InvoiceStore, NewInvoice, StoreCounts, StoredChargeLine, StoredInvoice};
use crate::error::Result;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and make sure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        let store = Self::with_connection(conn)?;
        info!("Opened invoice database {}", path.as_ref().display());
        Ok(store)
    }

    /// A private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS facturas (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          filename TEXT NOT NULL,
          nombre TEXT NOT NULL,
          fecha TEXT,
          gas TEXT NOT NULL,
          credito TEXT NOT NULL,
          total TEXT NOT NULL,
          consumo_m3 TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS detalles (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          factura_id INTEGER NOT NULL,
          concepto TEXT NOT NULL,
          valor_pagar TEXT NOT NULL,
          FOREIGN KEY(factura_id) REFERENCES facturas(id)
        );

        CREATE INDEX IF NOT EXISTS idx_facturas_filename ON facturas(filename);
        CREATE INDEX IF NOT EXISTS idx_detalles_factura ON detalles(factura_id, concepto, valor_pagar);
        ",
    )?;
    ensure_column(conn, "facturas", "source_filename TEXT NOT NULL DEFAULT ''")?;
    debug!("Invoice schema ready");
    Ok(())
}

/// Add `definition`'s column to `table` unless it is already there.
fn ensure_column(conn: &Connection, table: &str, definition: &str) -> Result<()> {
    let Some(column) = definition.split_whitespace().next() else {
        return Ok(());
    };

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let existing: String = row.get(1)?;
        if existing == column {
            return Ok(());
        }
    }

    conn.execute(&format!("ALTER TABLE {table} ADD COLUMN {definition}"), [])?;
    info!("Added column {} to {}", column, table);
    Ok(())
}

fn parse_date(value: Option<String>) -> Option<NaiveDate> {
    value.and_then(|v| NaiveDate::parse_from_str(&v, DATE_FORMAT).ok())
}

fn invoice_from_row(row: &Row<'_>) -> rusqlite::Result<StoredInvoice> {
    Ok(StoredInvoice {
        id: row.get(0)?,
        key: row.get(1)?,
        payer_name: row.get(2)?,
        date: parse_date(row.get(3)?),
        gas_amount: row.get(4)?,
        credit_amount: row.get(5)?,
        total_amount: row.get(6)?,
        consumption_m3: row.get(7)?,
        source_filename: row.get(8)?,
    })
}

impl InvoiceStore for SqliteStore {
    fn existing_keys(&self) -> Result<HashMap<String, String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT filename, source_filename FROM facturas ORDER BY id DESC")?;
        // Descending so the oldest row's file name wins for a duplicated key
        let keys = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<HashMap<_, _>>>()?;
        Ok(keys)
    }

    fn insert_invoice(&self, invoice: &NewInvoice) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO facturas
               (filename, nombre, fecha, gas, credito, total, consumo_m3, source_filename)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                invoice.key,
                invoice.payer_name,
                invoice.date.map(|d| d.format(DATE_FORMAT).to_string()),
                invoice.gas_amount,
                invoice.credit_amount,
                invoice.total_amount,
                invoice.consumption_m3,
                invoice.source_filename,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn find_invoice_id(&self, key: &str) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM facturas WHERE filename = ?1 ORDER BY id LIMIT 1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn charge_line_exists(&self, invoice_id: i64, concept: &str, amount: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM detalles
                 WHERE factura_id = ?1 AND concepto = ?2 AND valor_pagar = ?3
                 LIMIT 1",
                params![invoice_id, concept, amount],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn insert_charge_line(&self, invoice_id: i64, concept: &str, amount: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO detalles (factura_id, concepto, valor_pagar) VALUES (?1, ?2, ?3)",
            params![invoice_id, concept, amount],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn counts(&self) -> Result<StoreCounts> {
        let invoices: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM facturas", [], |row| row.get(0))?;
        let charge_lines: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM detalles", [], |row| row.get(0))?;
        Ok(StoreCounts {
            invoices: invoices as usize,
            charge_lines: charge_lines as usize,
        })
    }

    fn list_invoices(&self) -> Result<Vec<StoredInvoice>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, filename, nombre, fecha, gas, credito, total, consumo_m3, source_filename
             FROM facturas
             ORDER BY fecha IS NULL, fecha DESC, id",
        )?;
        let invoices = stmt
            .query_map([], invoice_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(invoices)
    }

    fn list_charge_lines(&self, invoice_id: i64) -> Result<Vec<StoredChargeLine>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, factura_id, concepto, valor_pagar
             FROM detalles
             WHERE factura_id = ?1
             ORDER BY id",
        )?;
        let lines = stmt
            .query_map(params![invoice_id], |row| {
                Ok(StoredChargeLine {
                    id: row.get(0)?,
                    invoice_id: row.get(1)?,
                    concept: row.get(2)?,
                    amount_to_pay: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn invoice(key: &str, date: Option<&str>) -> NewInvoice {
        NewInvoice {
            key: key.to_string(),
            source_filename: format!("enero_{key}.pdf"),
            payer_name: "JUAN PEREZ".to_string(),
            date: date.map(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).unwrap()),
            gas_amount: "1000".to_string(),
            credit_amount: "200".to_string(),
            total_amount: "1200".to_string(),
            consumption_m3: "37".to_string(),
        }
    }

    #[test]
    fn test_insert_and_find_invoice() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store.insert_invoice(&invoice("0012345", Some("2023-02-01"))).unwrap();

        assert_eq!(store.find_invoice_id("0012345").unwrap(), Some(id));
        assert_eq!(store.find_invoice_id("9999999").unwrap(), None);
        assert_eq!(
            store.existing_keys().unwrap().get("0012345").map(String::as_str),
            Some("enero_0012345.pdf")
        );
    }

    #[test]
    fn test_charge_line_existence() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store.insert_invoice(&invoice("0012345", None)).unwrap();

        assert!(!store.charge_line_exists(id, "GAS", "1000").unwrap());
        store.insert_charge_line(id, "GAS", "1000").unwrap();
        assert!(store.charge_line_exists(id, "GAS", "1000").unwrap());
        assert!(!store.charge_line_exists(id, "GAS", "999").unwrap());
    }

    #[test]
    fn test_charge_line_requires_parent() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.insert_charge_line(42, "GAS", "1000").is_err());
    }

    #[test]
    fn test_list_invoices_newest_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_invoice(&invoice("a", Some("2023-01-15"))).unwrap();
        store.insert_invoice(&invoice("b", None)).unwrap();
        store.insert_invoice(&invoice("c", Some("2024-03-01"))).unwrap();

        let keys: Vec<String> = store
            .list_invoices()
            .unwrap()
            .into_iter()
            .map(|i| i.key)
            .collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_counts_and_charge_listing() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store.insert_invoice(&invoice("a", None)).unwrap();
        store.insert_charge_line(id, "GAS", "1000").unwrap();
        store.insert_charge_line(id, "SUBSIDIO", "500").unwrap();

        assert_eq!(
            store.counts().unwrap(),
            StoreCounts {
                invoices: 1,
                charge_lines: 2
            }
        );
        let concepts: Vec<String> = store
            .list_charge_lines(id)
            .unwrap()
            .into_iter()
            .map(|l| l.concept)
            .collect();
        assert_eq!(concepts, vec!["GAS", "SUBSIDIO"]);
    }

    #[test]
    fn test_reopen_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facturas.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_invoice(&invoice("a", Some("2023-01-15"))).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        let listed = store.list_invoices().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].date, NaiveDate::from_ymd_opt(2023, 1, 15));
    }

    #[test]
    fn test_open_adds_source_filename_to_older_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facturas.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE facturas (
                   id INTEGER PRIMARY KEY AUTOINCREMENT,
                   filename TEXT NOT NULL,
                   nombre TEXT NOT NULL,
                   fecha TEXT,
                   gas TEXT NOT NULL,
                   credito TEXT NOT NULL,
                   total TEXT NOT NULL,
                   consumo_m3 TEXT NOT NULL
                 );
                 INSERT INTO facturas (filename, nombre, fecha, gas, credito, total, consumo_m3)
                 VALUES ('0012345', 'JUAN PEREZ', NULL, '1', '0', '1', '0');",
            )
            .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.existing_keys().unwrap().get("0012345").map(String::as_str),
            Some("")
        );
        store.insert_invoice(&invoice("0067890", None)).unwrap();
        assert_eq!(store.list_invoices().unwrap().len(), 2);

        // Opening again must not try to add the column twice
        assert!(SqliteStore::open(&path).is_ok());
    }

    #[test]
    fn test_open_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("facturas.db");
        assert!(SqliteStore::open(&path).is_err());
    }
}
