//! Core library for utility invoice extraction and loading.
//!
//! This crate provides:
//! - PDF to text dumping (lopdf + pdf-extract)
//! - Splitting a text dump into per-document segments
//! - Rule-chain extraction of invoice fields and itemized charge lines
//! - CSV intermediate tables
//! - Idempotent incremental loading into SQLite

pub mod csv_io;
pub mod error;
pub mod invoice;
pub mod loader;
pub mod models;
pub mod pdf;
pub mod pipeline;
pub mod storage;
pub mod text;

pub use error::{FacturasError, PdfError, Result, RowError};
pub use invoice::{ExtractionResult, GeneralExtractor, InvoiceParser, ItemExtractor};
pub use loader::{KeyCollision, LoadReport, collisions, load, normalize_key};
pub use models::{ChargeLine, FacturasConfig, InvoiceRecord};
pub use pdf::{PdfExtractor, PdfProcessor};
pub use pipeline::{PassReport, run_pass};
pub use storage::{InvoiceStore, SqliteStore};
pub use text::{DocumentSegment, split_segments};
