//! Natural keys derived from document file names.
//!
//! Stored invoices are identified by the last seven characters of the file
//! name without its extension. The key is lossy: two files sharing that
//! suffix map to the same invoice. It is kept for compatibility with data
//! already stored under it, and [`collisions`] reports the groups that clash.

use std::collections::BTreeMap;

use serde::Serialize;

/// Characters kept from the end of the base name.
pub const KEY_LENGTH: usize = 7;

/// Derive the normalized key of `filename`.
///
/// The extension is everything after the last `.`. Base names shorter than
/// [`KEY_LENGTH`] are returned whole.
pub fn normalize_key(filename: &str) -> String {
    let base = filename.rsplit_once('.').map_or(filename, |(base, _)| base);
    let skip = base.chars().count().saturating_sub(KEY_LENGTH);
    base.chars().skip(skip).collect()
}

/// File names that normalize to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyCollision {
    pub key: String,
    /// Distinct file names in first-seen order.
    pub filenames: Vec<String>,
}

/// Group `filenames` by key and return only the groups with more than one
/// distinct name, ordered by key.
pub fn collisions<I, S>(filenames: I) -> Vec<KeyCollision>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for filename in filenames {
        let filename = filename.as_ref();
        let group = groups.entry(normalize_key(filename)).or_default();
        if !group.iter().any(|f| f == filename) {
            group.push(filename.to_string());
        }
    }

    groups
        .into_iter()
        .filter(|(_, names)| names.len() > 1)
        .map(|(key, filenames)| KeyCollision { key, filenames })
        .collect()
}
