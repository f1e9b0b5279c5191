//! Splits a concatenated text dump into per-document segments.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    /// `----- name -----` on a line of its own.
    static ref DELIMITER: Regex =
        Regex::new(r"(?m)^-----[ \t]*(.+?)[ \t]*-----[ \t\r]*$").unwrap();
}

/// The slice of a text dump belonging to one source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSegment {
    /// Name captured from the delimiter line, `None` when the dump had none.
    pub source_name: Option<String>,
    /// Trimmed, non-blank lines in document order.
    pub lines: Vec<String>,
}

impl DocumentSegment {
    /// Build a segment from raw text, normalizing lines.
    pub fn from_text(source_name: Option<String>, text: &str) -> Self {
        let lines = text
            .lines()
            .map(|l| l.replace('\u{00a0}', " ").trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Self { source_name, lines }
    }

    /// Source name or an empty string.
    pub fn filename(&self) -> &str {
        self.source_name.as_deref().unwrap_or("")
    }

    /// The first `n` lines, or all of them when the segment is shorter.
    pub fn head(&self, n: usize) -> &[String] {
        &self.lines[..n.min(self.lines.len())]
    }

    /// The last `n` lines, or all of them when the segment is shorter.
    pub fn tail(&self, n: usize) -> &[String] {
        &self.lines[self.lines.len().saturating_sub(n)..]
    }
}

/// Split a text dump on delimiter lines.
///
/// One segment is produced per delimiter; text before the first delimiter
/// is ignored. Without any delimiter the whole input becomes a single
/// unnamed segment, so the result is never empty.
pub fn split_segments(dump: &str) -> Vec<DocumentSegment> {
    let delimiters: Vec<_> = DELIMITER.captures_iter(dump).collect();

    if delimiters.is_empty() {
        debug!("no delimiters found, treating dump as a single document");
        return vec![DocumentSegment::from_text(None, dump)];
    }

    let mut segments = Vec::with_capacity(delimiters.len());
    for (i, caps) in delimiters.iter().enumerate() {
        let start = caps.get(0).map_or(0, |m| m.end());
        let name = caps[1].trim().to_string();
        let end = delimiters
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(dump.len(), |m| m.start());

        segments.push(DocumentSegment::from_text(Some(name), &dump[start..end]));
    }

    debug!("split dump into {} segments", segments.len());
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_delimiters() {
        let dump = "----- a.pdf -----\nJUAN PEREZ\n\n  01/02/2023  \n----- b.pdf -----\nANA GOMEZ\n";
        let segments = split_segments(dump);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].source_name.as_deref(), Some("a.pdf"));
        assert_eq!(segments[0].lines, vec!["JUAN PEREZ", "01/02/2023"]);
        assert_eq!(segments[1].source_name.as_deref(), Some("b.pdf"));
        assert_eq!(segments[1].lines, vec!["ANA GOMEZ"]);
    }

    #[test]
    fn test_no_delimiter_yields_single_segment() {
        let segments = split_segments("JUAN PEREZ\n$1.000\n");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].source_name, None);
        assert_eq!(segments[0].lines.len(), 2);
    }

    #[test]
    fn test_empty_input_yields_one_degenerate_segment() {
        let segments = split_segments("");
        assert_eq!(segments.len(), 1);
        assert!(segments[0].lines.is_empty());
    }

    #[test]
    fn test_segment_count_matches_delimiters() {
        let dump = "preamble\n----- a.pdf -----\n----- b.pdf -----\n-----   c 1.pdf   -----\nx\n";
        let segments = split_segments(dump);
        assert_eq!(segments.len(), 3);
        assert!(segments[0].lines.is_empty());
        assert_eq!(segments[2].filename(), "c 1.pdf");
    }

    #[test]
    fn test_delimiter_must_fill_the_line() {
        let segments = split_segments("text ----- a.pdf ----- text\n");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].source_name, None);
    }

    #[test]
    fn test_non_breaking_spaces_are_normalized() {
        let segment = DocumentSegment::from_text(None, "JUAN\u{00a0}PEREZ\u{00a0}\n");
        assert_eq!(segment.lines, vec!["JUAN PEREZ"]);
    }

    #[test]
    fn test_head_and_tail_clamp() {
        let segment = DocumentSegment::from_text(None, "a\nb\nc");
        assert_eq!(segment.head(10).len(), 3);
        assert_eq!(segment.head(2), &["a".to_string(), "b".to_string()]);
        assert_eq!(segment.tail(1), &["c".to_string()]);
        assert_eq!(segment.tail(10).len(), 3);
    }
}
