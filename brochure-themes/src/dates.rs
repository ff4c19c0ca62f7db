//! Day labels derived from the departure date.

use chrono::{Datelike, Days, NaiveDate};

/// Calendar date of trip day `offset` (zero-based).
///
/// Returns `None` when the departure date is missing or not `YYYY-MM-DD`.
#[must_use]
pub fn trip_day(departure: Option<&str>, offset: usize) -> Option<NaiveDate> {
    let start = NaiveDate::parse_from_str(departure?.trim(), "%Y-%m-%d").ok()?;
    start.checked_add_days(Days::new(u64::try_from(offset).ok()?))
}

/// `05/01 (Wed)`
#[must_use]
pub fn short_label(date: NaiveDate) -> String {
    date.format("%m/%d (%a)").to_string()
}

/// `05.01 Wed`
#[must_use]
pub fn compact_label(date: NaiveDate) -> String {
    date.format("%m.%d %a").to_string()
}

/// `2024.05.01 / WED`
#[must_use]
pub fn dotted_label(date: NaiveDate) -> String {
    format!(
        "{} / {}",
        date.format("%Y.%m.%d"),
        date.format("%a").to_string().to_uppercase()
    )
}

/// `MAY 01 · WEDNESDAY`
#[must_use]
pub fn long_label(date: NaiveDate) -> String {
    format!(
        "{} {:02} · {}",
        date.format("%b").to_string().to_uppercase(),
        date.day(),
        date.format("%A").to_string().to_uppercase()
    )
}

/// Format day `offset` with `format`, or an empty string when the date is unknown.
#[must_use]
pub fn label_for(departure: Option<&str>, offset: usize, format: fn(NaiveDate) -> String) -> String {
    trip_day(departure, offset).map(format).unwrap_or_default()
}

const KANJI_NUMERALS: [&str; 10] = ["壱", "弐", "参", "肆", "伍", "陸", "漆", "捌", "玖", "拾"];

/// Formal kanji numeral for day `number` (one-based), falling back to digits.
#[must_use]
pub fn kanji_numeral(number: usize) -> String {
    number
        .checked_sub(1)
        .and_then(|i| KANJI_NUMERALS.get(i))
        .map_or_else(|| number.to_string(), |k| (*k).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trip_day_offsets() {
        let date = trip_day(Some("2024-04-29"), 3).expect("date");
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 2).expect("valid"));
        assert!(trip_day(Some("29/04/2024"), 0).is_none());
        assert!(trip_day(None, 0).is_none());
    }

    #[test]
    fn test_labels() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid");
        assert_eq!(short_label(date), "05/01 (Wed)");
        assert_eq!(compact_label(date), "05.01 Wed");
        assert_eq!(dotted_label(date), "2024.05.01 / WED");
        assert_eq!(long_label(date), "MAY 01 · WEDNESDAY");
        assert_eq!(label_for(None, 0, short_label), "");
    }

    #[test]
    fn test_kanji_numeral() {
        assert_eq!(kanji_numeral(1), "壱");
        assert_eq!(kanji_numeral(10), "拾");
        assert_eq!(kanji_numeral(11), "11");
        assert_eq!(kanji_numeral(0), "0");
    }
}
