//! Date helpers.

use chrono::NaiveDate;

use super::patterns::DATE_DMY;

/// First `d/m/yyyy` substring in `text`, as written.
pub fn find_date(text: &str) -> Option<&str> {
    DATE_DMY.find(text).map(|m| m.as_str())
}

/// Byte offset of the first `d/m/yyyy` substring in `text`.
pub fn date_position(text: &str) -> Option<usize> {
    DATE_DMY.find(text).map(|m| m.start())
}

/// Parse a textual `d/m/yyyy` date into a calendar date.
pub fn parse_dmy(text: &str) -> Option<NaiveDate> {
    let caps = DATE_DMY.captures(text.trim())?;
    if caps.get(0)?.as_str() != text.trim() {
        return None;
    }
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_date() {
        assert_eq!(find_date("Fecha: 01/02/2023 x"), Some("01/02/2023"));
        assert_eq!(find_date("1/2/2023"), Some("1/2/2023"));
        assert_eq!(find_date("2023-02-01"), None);
    }

    #[test]
    fn test_parse_dmy() {
        assert_eq!(parse_dmy("01/02/2023"), NaiveDate::from_ymd_opt(2023, 2, 1));
        assert_eq!(parse_dmy(" 5/11/2024 "), NaiveDate::from_ymd_opt(2024, 11, 5));
    }

    #[test]
    fn test_parse_dmy_rejects_invalid() {
        assert_eq!(parse_dmy("31/02/2023"), None);
        assert_eq!(parse_dmy("01/02/2023 extra"), None);
        assert_eq!(parse_dmy(""), None);
    }
}
