use chrono::{DateTime, Datelike, Local, NaiveDate};
use std::ops::RangeInclusive;

/// Rendering used in every response, e.g. `Mon Jan 02 2006`.
pub const DISPLAY_FORMAT: &str = "%a %b %d %Y";

/// Years whose ISO text is exactly four digits, so stored dates order
/// the same textually and chronologically.
const STORABLE_YEARS: RangeInclusive<i32> = 0..=9999;

/// Parses a caller-supplied calendar date. Accepts `YYYY-MM-DD`, or an
/// RFC 3339 timestamp whose date part (in its own offset) is kept.
/// Signed or five-digit years are rejected.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
        .filter(|date| STORABLE_YEARS.contains(&date.year()))
}

pub fn display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Current calendar day in the server's local time zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_date_matches_weekday_format() {
        let date = NaiveDate::from_ymd_opt(2006, 1, 2).unwrap();
        assert_eq!(display_date(date), "Mon Jan 02 2006");

        let date = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        assert_eq!(display_date(date), "Wed Dec 25 2024");
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_calendar_date("2024-02-29"),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            parse_calendar_date(" 1990-01-01 "),
            NaiveDate::from_ymd_opt(1990, 1, 1)
        );
    }

    #[test]
    fn test_parse_rfc3339_keeps_date_part() {
        assert_eq!(
            parse_calendar_date("2024-03-10T23:30:00-05:00"),
            NaiveDate::from_ymd_opt(2024, 3, 10)
        );
    }

    #[test]
    fn test_parse_rejects_invalid_dates() {
        assert_eq!(parse_calendar_date("2023-02-29"), None);
        assert_eq!(parse_calendar_date("not a date"), None);
        assert_eq!(parse_calendar_date(""), None);
        assert_eq!(parse_calendar_date("2024-13-01"), None);
    }

    #[test]
    fn test_parse_rejects_years_outside_four_digits() {
        assert_eq!(parse_calendar_date("+12345-01-01"), None);
        assert_eq!(parse_calendar_date("-0001-01-01"), None);
        assert_eq!(parse_calendar_date("10000-01-01"), None);
        assert_eq!(
            parse_calendar_date("0000-01-01"),
            NaiveDate::from_ymd_opt(0, 1, 1)
        );
        assert_eq!(
            parse_calendar_date("9999-12-31"),
            NaiveDate::from_ymd_opt(9999, 12, 31)
        );
    }
}
