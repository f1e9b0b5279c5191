//! Billing table extraction.
//!
//! The table is a run of lines that start with a 1-2 digit row index:
//!
//! ```text
//! 1 100 CONSUMO GAS 26,815 26,815
//! 2 N SUBSIDIO -3,500 0
//! ```
//!
//! Rows are read with a strict pattern first and a lenient token parser as
//! a fallback. Lines neither understands are skipped.

use tracing::{debug, trace};

use super::rules::amounts::{choose_pay_value, digits_or_zero, numeric_tokens};
use super::rules::patterns::{
    AMOUNT_LIKE, ITEM_ANY_ROW, ITEM_FIRST_ROW, ITEM_ROW, LEADING_INDEX, NUMERIC_TOKEN,
};
use crate::models::invoice::ChargeLine;
use crate::text::DocumentSegment;

/// Highest row index accepted as part of the table.
const MAX_ROW_INDEX: u32 = 99;
/// Minimum whitespace tokens for the lenient row parser.
const LENIENT_MIN_TOKENS: usize = 6;

/// Extracts itemized charge lines from a document segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemExtractor;

impl ItemExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract charge lines in document order.
    pub fn extract(&self, segment: &DocumentSegment) -> Vec<ChargeLine> {
        let start = table_start(&segment.lines);
        let filename = segment.filename();
        let mut items = Vec::new();

        for line in &segment.lines[start..] {
            match row_index(line) {
                Some(index) if index <= MAX_ROW_INDEX => {}
                _ => break,
            }

            let parsed = parse_strict_row(line).or_else(|| parse_lenient_row(line));
            match parsed {
                Some(row) => items.push(ChargeLine {
                    filename: filename.to_string(),
                    concept_id: row.concept_id,
                    concept: row.concept,
                    amount_to_pay: row.amount_to_pay,
                }),
                None => trace!(line = line.as_str(), "skipping unparseable table row"),
            }
        }

        debug!(filename, rows = items.len(), "extracted charge lines");
        items
    }
}

/// A parsed billing row, before it is tied to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub concept_id: String,
    pub concept: String,
    pub amount_to_pay: String,
}

/// Where the table begins: the row indexed `1`, else any indexed row, else
/// the first line.
fn table_start(lines: &[String]) -> usize {
    lines
        .iter()
        .position(|l| ITEM_FIRST_ROW.is_match(l))
        .or_else(|| lines.iter().position(|l| ITEM_ANY_ROW.is_match(l)))
        .unwrap_or(0)
}

/// The leading row index, or `None` if the line does not begin with one or
/// two digits followed by whitespace.
fn row_index(line: &str) -> Option<u32> {
    let caps = LEADING_INDEX.captures(line)?;
    let digits = &caps[1];
    if digits.len() > 2 {
        return None;
    }
    digits.parse().ok()
}

/// `<index> <id> <concept> <amount> <amount> [<amount>]`.
pub fn parse_strict_row(line: &str) -> Option<ParsedRow> {
    let caps = ITEM_ROW.captures(line)?;
    let prefix_end = caps.get(2)?.end();
    let rest = line[prefix_end..].trim();

    let tokens = numeric_tokens(rest);
    let concept = match NUMERIC_TOKEN.find(rest) {
        Some(first) => rest[..first.start()].trim().to_string(),
        None => caps[3].trim().to_string(),
    };

    Some(ParsedRow {
        concept_id: caps[2].to_string(),
        concept,
        amount_to_pay: choose_pay_value(&tokens),
    })
}

/// Token-based fallback for rows whose id is not 3-4 digits.
///
/// Requires at least six tokens with the first two purely numeric. The
/// concept runs from the third token to the first amount-looking token; the
/// amount to pay is the second amount-looking token. The scan starts after
/// the id, so an id is never taken for an amount.
pub fn parse_lenient_row(line: &str) -> Option<ParsedRow> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < LENIENT_MIN_TOKENS
        || !parts[0].chars().all(|c| c.is_ascii_digit())
        || !parts[1].chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let amounts: Vec<usize> = (2..parts.len())
        .filter(|&i| AMOUNT_LIKE.is_match(parts[i]))
        .collect();
    if amounts.len() < 2 {
        return None;
    }

    Some(ParsedRow {
        concept_id: parts[1].to_string(),
        concept: parts[2..amounts[0]].join(" "),
        amount_to_pay: digits_or_zero(parts[amounts[1]]),
    })
}
