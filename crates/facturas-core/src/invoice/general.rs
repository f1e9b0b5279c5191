//! Invoice-level field extraction.
//!
//! Produces exactly one [`InvoiceRecord`] per segment. Fields whose chain
//! finds nothing are left empty.

use tracing::debug;

use super::rules::amounts::{
    clean_amount, cleaned_currency_tokens, currency_tokens, plausible_consumption,
};
use super::rules::names::strip_trailing_date;
use super::rules::patterns::TOTAL_KEYWORDS;
use super::rules::{Resolved, RuleChain, StopWords, find_date, name_chain};
use crate::models::invoice::InvoiceRecord;
use crate::text::DocumentSegment;

/// Lines searched for the issue date.
const DATE_WINDOW: usize = 12;
/// Lines searched for charge amounts and total keywords.
const HEADER_WINDOW: usize = 16;
/// Lines searched for a lone `$` total.
const LONE_TOTAL_WINDOW: usize = 40;
/// Lines scanned forward from the total for the consumption.
const CONSUMPTION_LOOKAHEAD: usize = 80;
/// Trailing lines scanned backwards for the consumption.
const TRAILING_WINDOW: usize = 120;

/// Gas and credit charges, as digit strings.
pub type Charges = (String, String);

/// Extracts invoice-level fields from a document segment.
#[derive(Debug, Clone, Default)]
pub struct GeneralExtractor {
    stop_words: StopWords,
}

impl GeneralExtractor {
    pub fn new(stop_words: StopWords) -> Self {
        Self { stop_words }
    }

    /// Extract one record. Never fails; misses leave fields empty.
    pub fn extract(&self, segment: &DocumentSegment) -> InvoiceRecord {
        let name = name_chain(&self.stop_words).resolve(segment);
        let date = date_chain().resolve(segment);
        let charges = charges_chain().resolve(segment);
        let total = total_chain().resolve(segment);

        let total_digits = total.as_ref().map(|r| r.value.clone()).unwrap_or_default();
        let consumption = consumption_chain(&total_digits).resolve(segment);

        debug!(
            filename = segment.filename(),
            name_rule = rule_of(&name),
            date_rule = rule_of(&date),
            charges_rule = rule_of(&charges),
            total_rule = rule_of(&total),
            consumption_rule = rule_of(&consumption),
            "resolved invoice fields"
        );

        let (gas_amount, credit_amount) = charges.map(|r| r.value).unwrap_or_default();

        InvoiceRecord {
            filename: segment.filename().to_string(),
            payer_name: name
                .map(|r| strip_trailing_date(&r.value))
                .unwrap_or_default(),
            date: date.map(|r| r.value).unwrap_or_default(),
            gas_amount,
            credit_amount,
            total_amount: total_digits,
            consumption_m3: consumption.map(|r| r.value).unwrap_or_default(),
        }
    }
}

fn rule_of<T>(resolved: &Option<Resolved<T>>) -> &'static str {
    resolved.as_ref().map(|r| r.rule).unwrap_or("none")
}

/// The header line carrying two or more currency tokens, if any.
fn charges_line(segment: &DocumentSegment) -> Option<Vec<String>> {
    segment
        .head(HEADER_WINDOW)
        .iter()
        .map(|line| currency_tokens(line))
        .find(|tokens| tokens.len() >= 2)
        .map(|tokens| tokens.into_iter().map(clean_amount).collect())
}

pub fn date_chain() -> RuleChain<'static, String> {
    RuleChain::new("date").rule("header_date", |segment| {
        segment
            .head(DATE_WINDOW)
            .iter()
            .find_map(|line| find_date(line))
            .map(str::to_string)
    })
}

pub fn charges_chain() -> RuleChain<'static, Charges> {
    RuleChain::new("charges")
        .rule("charges_line", |segment| {
            charges_line(segment).map(|tokens| (tokens[0].clone(), tokens[1].clone()))
        })
        .rule("header_tokens", |segment| {
            let mut tokens = cleaned_currency_tokens(segment.head(HEADER_WINDOW)).into_iter();
            let gas = tokens.next()?;
            Some((gas, tokens.next().unwrap_or_default()))
        })
}

pub fn total_chain() -> RuleChain<'static, String> {
    RuleChain::new("total")
        .rule("keyword_line", |segment| {
            segment
                .head(HEADER_WINDOW)
                .iter()
                .filter(|line| TOTAL_KEYWORDS.is_match(line))
                .find_map(|line| currency_tokens(line).last().map(|t| clean_amount(t)))
        })
        .rule("lone_dollar_line", |segment| {
            segment
                .head(LONE_TOTAL_WINDOW)
                .iter()
                .filter(|line| line.starts_with('$'))
                .map(|line| currency_tokens(line))
                .find(|tokens| tokens.len() == 1)
                .map(|tokens| clean_amount(tokens[0]))
        })
        .rule("last_header_token", |segment| {
            // Only meaningful when the charges came from the loose header scan.
            if charges_line(segment).is_some() {
                return None;
            }
            cleaned_currency_tokens(segment.head(HEADER_WINDOW)).pop()
        })
}

/// Index of the line where the total's digits appear.
fn total_line_index(segment: &DocumentSegment, total: &str) -> Option<usize> {
    if total.is_empty() {
        return None;
    }
    segment.lines.iter().position(|line| {
        currency_tokens(line).iter().any(|t| clean_amount(t) == total)
            || clean_amount(line).contains(total)
    })
}

pub fn consumption_chain(total: &str) -> RuleChain<'_, String> {
    RuleChain::new("consumption")
        .rule("after_total", move |segment| {
            let start = total_line_index(segment, total).map_or(0, |i| i + 1);
            segment
                .lines
                .iter()
                .skip(start)
                .take(CONSUMPTION_LOOKAHEAD)
                .find_map(|line| plausible_consumption(line))
        })
        .rule("trailing_scan", |segment| {
            segment
                .tail(TRAILING_WINDOW)
                .iter()
                .rev()
                .find_map(|line| plausible_consumption(line))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::models::config::default_stop_words;
    use crate::text::split_segments;

    fn extractor() -> GeneralExtractor {
        GeneralExtractor::new(StopWords::new(default_stop_words()))
    }

    fn segment(text: &str) -> DocumentSegment {
        DocumentSegment::from_text(Some("doc.pdf".to_string()), text)
    }

    #[test]
    fn test_basic_layout() {
        let dump = "----- a.pdf -----\nJUAN PEREZ\n01/02/2023\n$1.000 $200\n$1.200 TOTAL\n1 100 GAS 900 1000\n";
        let segments = split_segments(dump);
        let record = extractor().extract(&segments[0]);

        assert_eq!(
            record,
            InvoiceRecord {
                filename: "a.pdf".to_string(),
                payer_name: "JUAN PEREZ".to_string(),
                date: "01/02/2023".to_string(),
                gas_amount: "1000".to_string(),
                credit_amount: "200".to_string(),
                total_amount: "1200".to_string(),
                consumption_m3: String::new(),
            }
        );
    }

    #[test]
    fn test_empty_segment_yields_empty_record() {
        let record = extractor().extract(&segment(""));
        assert_eq!(record, InvoiceRecord::empty("doc.pdf"));
    }

    #[test]
    fn test_name_with_embedded_date_is_trimmed() {
        let record = extractor().extract(&segment("Maria Lopez 05/06/2024\n"));
        assert_eq!(record.payer_name, "Maria Lopez");
        assert_eq!(record.date, "05/06/2024");
    }

    #[test]
    fn test_date_outside_window_is_ignored() {
        let mut text = "linea\n".repeat(12);
        text.push_str("01/02/2023\n");
        assert_eq!(extractor().extract(&segment(&text)).date, "");
    }

    #[test]
    fn test_charges_fall_back_to_header_tokens() {
        let record = extractor().extract(&segment("Cargo gas $ 26,815\nCredito $3.500\n"));
        assert_eq!(record.gas_amount, "26815");
        assert_eq!(record.credit_amount, "3500");
    }

    #[test]
    fn test_single_header_token_leaves_credit_empty() {
        let record = extractor().extract(&segment("Cargo gas $ 26,815\n"));
        assert_eq!(record.gas_amount, "26815");
        assert_eq!(record.credit_amount, "");
    }

    #[test]
    fn test_total_keyword_takes_last_token() {
        let text = "$10 $20\nValor a pagar $5 $45.300\n";
        let record = extractor().extract(&segment(text));
        assert_eq!(record.total_amount, "45300");
    }

    #[test]
    fn test_keyword_without_amount_is_skipped() {
        let text = "TOTAL\nA pagar $7.700\n";
        assert_eq!(extractor().extract(&segment(text)).total_amount, "7700");
    }

    #[test]
    fn test_total_from_lone_dollar_line() {
        let mut text = String::from("$10 $20\n");
        text.push_str(&"relleno\n".repeat(20));
        text.push_str("$ 58.000\n");
        let record = extractor().extract(&segment(&text));
        assert_eq!(record.total_amount, "58000");
    }

    #[test]
    fn test_total_from_last_header_token() {
        let text = "gas $100\ncredito $20\nsaldo $120\n";
        let record = extractor().extract(&segment(text));
        assert_eq!(record.gas_amount, "100");
        assert_eq!(record.credit_amount, "20");
        assert_eq!(record.total_amount, "120");
    }

    #[test]
    fn test_no_last_header_token_when_charges_line_found() {
        let text = "gas $100 credito $20\n";
        let record = extractor().extract(&segment(text));
        assert_eq!(record.total_amount, "");
    }

    #[test]
    fn test_consumption_after_total_line() {
        let text = "$1.000 $200\n$1.200 TOTAL\n99999\n0\n37\n12\n";
        let record = extractor().extract(&segment(text));
        assert_eq!(record.consumption_m3, "37");
    }

    #[test]
    fn test_consumption_before_total_is_ignored_by_forward_scan() {
        let text = "25\n$1.000 $200\n$1.200 TOTAL\nsin consumo\n";
        let record = extractor().extract(&segment(text));
        // forward scan finds nothing, the trailing scan walks back to "25"
        assert_eq!(record.consumption_m3, "25");
    }

    #[test]
    fn test_consumption_without_total_scans_from_start() {
        let record = extractor().extract(&segment("sin montos\n8\n6000\n14\n"));
        assert_eq!(record.consumption_m3, "8");
    }

    #[test]
    fn test_chain_rule_order() {
        assert_eq!(
            total_chain().rule_names(),
            vec!["keyword_line", "lone_dollar_line", "last_header_token"]
        );
        assert_eq!(consumption_chain("1").rule_names(), vec!["after_total", "trailing_scan"]);
        assert_eq!(charges_chain().rule_names(), vec!["charges_line", "header_tokens"]);
    }
}
