//! Amount and token utilities shared by both extractors.
//!
//! Amounts are kept as digit strings. `"$ 26,815"` and `"$26.815"` both clean
//! to `"26815"`; which separator is decimal is not decided here.

use super::patterns::{CURRENCY_TOKEN, NUMERIC_TOKEN, STANDALONE_INTEGER};

/// Consumption values outside this range are treated as noise.
pub const CONSUMPTION_RANGE: std::ops::RangeInclusive<u32> = 1..=5000;

/// All currency-marked tokens in `text`, in order.
pub fn currency_tokens(text: &str) -> Vec<&str> {
    CURRENCY_TOKEN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Currency tokens across several lines, cleaned, in order.
pub fn cleaned_currency_tokens(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .flat_map(|line| currency_tokens(line))
        .map(clean_amount)
        .collect()
}

/// Keep only the ASCII digits of `token`, in order.
pub fn clean_amount(token: &str) -> String {
    token.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Like [`clean_amount`], but an empty result becomes `"0"`.
pub fn digits_or_zero(token: &str) -> String {
    let digits = clean_amount(token);
    if digits.is_empty() {
        "0".to_string()
    } else {
        digits
    }
}

/// True when `digits` is empty or made only of zeros.
fn is_zero(digits: &str) -> bool {
    digits.chars().all(|c| c == '0')
}

/// Signed numeric tokens (`-36,156`, `1.000`, `0`) in order.
pub fn numeric_tokens(text: &str) -> Vec<&str> {
    NUMERIC_TOKEN.find_iter(text).map(|m| m.as_str()).collect()
}

/// A line that is only an integer of 1 to 5 digits.
pub fn standalone_integer(line: &str) -> Option<u32> {
    STANDALONE_INTEGER
        .captures(line)
        .and_then(|caps| caps[1].parse().ok())
}

/// A standalone integer within [`CONSUMPTION_RANGE`], returned as written.
pub fn plausible_consumption(line: &str) -> Option<String> {
    standalone_integer(line)
        .filter(|v| CONSUMPTION_RANGE.contains(v))
        .map(|_| line.trim().to_string())
}

/// Pick the amount to pay from the numeric tokens of a billing row.
///
/// Rows list the billed value then the value to pay. The second token wins,
/// except when it is zero while the first is not: subsidy rows print a
/// negative billed value followed by a zero net, and the subsidy magnitude is
/// what gets recorded. One token is used as is; no token gives `"0"`.
pub fn choose_pay_value(tokens: &[&str]) -> String {
    match tokens {
        [] => "0".to_string(),
        [only] => digits_or_zero(only),
        [first, second, ..] => {
            let first_digits = clean_amount(first);
            let second_digits = clean_amount(second);
            if is_zero(&second_digits) && !is_zero(&first_digits) {
                first_digits
            } else {
                digits_or_zero(second)
            }
        }
    }
}
