//! Payer name heuristics.
//!
//! The payer name has no label on the supported layout; it is the first
//! header line that looks like a person's name. Four rules relax the notion
//! of "looks like a name" step by step.

use super::RuleChain;
use super::dates::date_position;
use super::patterns::{NAME_SYMBOLS, UPPERCASE_NAME};
use crate::text::DocumentSegment;

const STRICT_WINDOW: usize = 16;
const WIDE_WINDOW: usize = 20;

/// Words that disqualify a line from being a name.
///
/// Matching is by case-insensitive substring, so short entries such as `KR`
/// also exclude longer words containing them.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: Vec<String>,
}

impl StopWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_uppercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// True if any stop word occurs in `line`.
    pub fn hits(&self, line: &str) -> bool {
        let upper = line.to_uppercase();
        self.words.iter().any(|w| upper.contains(w.as_str()))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn collapse_spaces(line: &str) -> String {
    line.trim().replace("  ", " ")
}

fn has_two_words(line: &str) -> bool {
    line.split_whitespace().nth(1).is_some()
}

fn has_digit(line: &str) -> bool {
    line.chars().any(|c| c.is_ascii_digit())
}

fn has_symbol(line: &str) -> bool {
    line.contains(NAME_SYMBOLS)
}

fn first_in_window(
    segment: &DocumentSegment,
    window: usize,
    accept: impl Fn(&str) -> bool,
) -> Option<String> {
    segment
        .head(window)
        .iter()
        .map(|line| collapse_spaces(line))
        .find(|line| accept(line))
}

/// Cut an embedded date and everything after it off a name.
pub fn strip_trailing_date(name: &str) -> String {
    match date_position(name) {
        Some(pos) => name[..pos].trim().to_string(),
        None => name.to_string(),
    }
}

/// Build the payer name chain.
pub fn name_chain(stop_words: &StopWords) -> RuleChain<'_, String> {
    RuleChain::new("name")
        .rule("uppercase_line", move |segment| {
            first_in_window(segment, STRICT_WINDOW, |line| {
                has_two_words(line)
                    && !has_digit(line)
                    && !has_symbol(line)
                    && UPPERCASE_NAME.is_match(line)
                    && !stop_words.hits(line)
            })
        })
        .rule("plain_words", move |segment| {
            first_in_window(segment, STRICT_WINDOW, |line| {
                has_two_words(line)
                    && !has_digit(line)
                    && !has_symbol(line)
                    && !stop_words.hits(line)
            })
        })
        .rule("words_with_symbols", move |segment| {
            first_in_window(segment, WIDE_WINDOW, |line| {
                has_two_words(line) && !has_digit(line) && !stop_words.hits(line)
            })
        })
        .rule("any_two_words", |segment| {
            first_in_window(segment, WIDE_WINDOW, has_two_words)
        })
}
