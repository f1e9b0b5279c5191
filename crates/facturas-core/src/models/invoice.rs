//! Extracted invoice rows, shaped like the intermediate CSV tables.

use serde::{Deserialize, Serialize};

/// One invoice-level row per document segment.
///
/// Every field defaults to an empty string when no heuristic matched. Amount
/// fields hold only decimal digits: separators, signs and currency marks are
/// stripped, never interpreted, because source documents disagree on which
/// separator is decimal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Source document name as it appeared in the text dump delimiter.
    #[serde(rename = "filename")]
    pub filename: String,

    /// Payer name.
    #[serde(rename = "Nombre")]
    pub payer_name: String,

    /// Issue date, textual `d/m/yyyy`.
    #[serde(rename = "Fecha")]
    pub date: String,

    /// Gas charge digits.
    #[serde(rename = "Gas")]
    pub gas_amount: String,

    /// Credit charge digits.
    #[serde(rename = "credito")]
    pub credit_amount: String,

    /// Amount to pay digits.
    #[serde(rename = "Total")]
    pub total_amount: String,

    /// Consumption in cubic meters.
    #[serde(rename = "Consumo_m3")]
    pub consumption_m3: String,
}

impl InvoiceRecord {
    /// Create an empty record for the given document.
    pub fn empty(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Default::default()
        }
    }

    /// How many of the six extracted fields are non-empty.
    pub fn coverage(&self) -> (usize, usize) {
        let filled = [
            &self.payer_name,
            &self.date,
            &self.gas_amount,
            &self.credit_amount,
            &self.total_amount,
            &self.consumption_m3,
        ]
        .iter()
        .filter(|v| !v.is_empty())
        .count();
        (filled, 6)
    }
}

/// One itemized charge from an invoice billing table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeLine {
    /// Source document name.
    #[serde(rename = "filename")]
    pub filename: String,

    /// Concept code, usually 3-4 digits or the marker `N`.
    #[serde(rename = "ID")]
    pub concept_id: String,

    /// Free-text concept description.
    #[serde(rename = "Concepto")]
    pub concept: String,

    /// Amount to pay digits, `"0"` when nothing numeric was found.
    #[serde(rename = "ValorPagar")]
    pub amount_to_pay: String,
}
