//! Invoice field extraction module.

mod general;
mod items;
pub mod rules;

pub use general::{GeneralExtractor, charges_chain, consumption_chain, date_chain, total_chain};
pub use items::{ItemExtractor, ParsedRow, parse_lenient_row, parse_strict_row};

use tracing::info;

use crate::models::config::ExtractionConfig;
use crate::models::invoice::{ChargeLine, InvoiceRecord};
use crate::text::{DocumentSegment, split_segments};
use rules::StopWords;

/// Both row sets extracted from a text dump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    /// One record per segment, in segment order.
    pub invoices: Vec<InvoiceRecord>,
    /// Charge lines of every segment, in document order.
    pub charges: Vec<ChargeLine>,
}

/// Runs both extractors over document segments.
#[derive(Debug, Clone, Default)]
pub struct InvoiceParser {
    general: GeneralExtractor,
    items: ItemExtractor,
}

impl InvoiceParser {
    pub fn new(stop_words: StopWords) -> Self {
        Self {
            general: GeneralExtractor::new(stop_words),
            items: ItemExtractor::new(),
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(StopWords::new(&config.name_stop_words))
    }

    /// Extract both row kinds from one segment.
    pub fn parse_segment(&self, segment: &DocumentSegment) -> (InvoiceRecord, Vec<ChargeLine>) {
        (self.general.extract(segment), self.items.extract(segment))
    }

    /// Split a text dump and extract every segment.
    pub fn parse_dump(&self, dump: &str) -> ExtractionResult {
        let mut result = ExtractionResult::default();
        for segment in split_segments(dump) {
            let (invoice, charges) = self.parse_segment(&segment);
            result.invoices.push(invoice);
            result.charges.extend(charges);
        }

        info!(
            invoices = result.invoices.len(),
            charge_lines = result.charges.len(),
            "extracted text dump"
        );
        result
    }
}
