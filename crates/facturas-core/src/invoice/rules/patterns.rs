//! Common regex patterns for utility invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Currency-marked amounts: "$26,815", "$ 26.815"
    pub static ref CURRENCY_TOKEN: Regex = Regex::new(
        r"\$\s*[\d.,]+"
    ).unwrap();

    // d/m/yyyy anywhere in a line
    pub static ref DATE_DMY: Regex = Regex::new(
        r"(\d{1,2})/(\d{1,2})/(\d{4})"
    ).unwrap();

    // Lines that are a bare 1-5 digit integer
    pub static ref STANDALONE_INTEGER: Regex = Regex::new(
        r"^\s*(\d{1,5})\s*$"
    ).unwrap();

    // Labels that precede the amount to pay
    pub static ref TOTAL_KEYWORDS: Regex = Regex::new(
        r"(?i)\b(total|valor a pagar|a pagar|importe)\b"
    ).unwrap();

    // Payer names: capitals, accented vowels and spaces only
    pub static ref UPPERCASE_NAME: Regex = Regex::new(
        r"^[A-ZÁÉÍÓÚÑ ]{8,}$"
    ).unwrap();

    // Billing table
    pub static ref ITEM_FIRST_ROW: Regex = Regex::new(
        r"^\s*0?1\s+\S+"
    ).unwrap();

    pub static ref ITEM_ANY_ROW: Regex = Regex::new(
        r"^\s*\d{1,2}\s+\S+"
    ).unwrap();

    pub static ref LEADING_INDEX: Regex = Regex::new(
        r"^\s*(\d+)\s+"
    ).unwrap();

    // <index> <id> <concept> <amount> <amount> [<amount>]
    pub static ref ITEM_ROW: Regex = Regex::new(
        r"(?i)^\s*(\d{1,2})\s+([0-9]{3,4}|N)\s+(.+?)\s+([0-9.,-]+)\s+([0-9.,-]+)(?:\s+([0-9.,-]+))?"
    ).unwrap();

    // Numeric tokens inside a billing row, sign included
    pub static ref NUMERIC_TOKEN: Regex = Regex::new(
        r"-?[0-9][0-9.,]*"
    ).unwrap();

    // Whitespace-split tokens that look like amounts in the lenient row parser
    pub static ref AMOUNT_LIKE: Regex = Regex::new(
        r"[0-9][.,]?[0-9]"
    ).unwrap();
}

/// Characters that rule out a line as a clean payer name.
pub const NAME_SYMBOLS: &[char] = &['"', '$', '%', '/', '.', ':', ',', ';'];
