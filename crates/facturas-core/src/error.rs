//! Error types for the facturas-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the facturas library.
///
/// Only fatal conditions live here. Heuristic misses, unparseable charge
/// lines and orphaned charge lines are not errors; they show up as empty
/// fields, skipped lines and counters in the load report.
#[derive(Error, Debug)]
pub enum FacturasError {
    /// A required input file or directory does not exist.
    #[error("input not found: {}", path.display())]
    InputMissing { path: PathBuf },

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Storage could not be opened or a statement failed.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Reading or writing an intermediate CSV failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Glob pattern error while listing source documents.
    #[error("pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl FacturasError {
    pub fn input_missing(path: impl Into<PathBuf>) -> Self {
        Self::InputMissing { path: path.into() }
    }
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Why a single invoice row was refused by the loader.
///
/// Rejections are per row: the run continues and the row is counted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    /// The date column is present but not day/month/year.
    #[error("unparseable date {value:?} for {filename}")]
    Date { filename: String, value: String },

    /// The row carries no file name, so no key can be derived.
    #[error("row without a file name")]
    NoFilename,
}

/// Result type for the facturas library.
pub type Result<T> = std::result::Result<T, FacturasError>;
