//! PDF processing module.

mod dump;
mod extractor;

pub use dump::{
    DumpEntry, DumpOutcome, EMPTY_TEXT_NOTICE, NO_DOCUMENTS_NOTICE, list_pdfs, write_text_dump,
};
pub use extractor::PdfExtractor;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF text extraction implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;
}
