//! Date parsing and formatting

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::error::ContentError;

/// Formats that carry their own UTC offset
const ZONED_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
];

/// Formats without an offset
const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A front-matter date, with or without an explicit offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    Zoned(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl ParsedDate {
    pub fn has_offset(&self) -> bool {
        matches!(self, ParsedDate::Zoned(_))
    }

    /// Pin the date to an offset, reading naive dates as wall time in `tz`
    pub fn resolve(self, tz: Tz) -> DateTime<FixedOffset> {
        match self {
            ParsedDate::Zoned(dt) => dt,
            ParsedDate::Naive(naive) => tz
                .from_local_datetime(&naive)
                .earliest()
                // Wall time inside a DST gap: read it as UTC instead
                .unwrap_or_else(|| tz.from_utc_datetime(&naive))
                .fixed_offset(),
        }
    }
}

/// Parse a post date string
///
/// RFC 3339 is tried first, then the looser ISO-8601-like forms authors
/// tend to write by hand.
pub fn parse_post_date(s: &str) -> Result<ParsedDate, ContentError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ContentError::InvalidDate {
            value: s.to_string(),
            reason: "empty date".to_string(),
        });
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(ParsedDate::Zoned(dt));
    }

    for fmt in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(ParsedDate::Zoned(dt));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ParsedDate::Naive(dt));
        }
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(ParsedDate::Naive(dt));
        }
    }

    Err(ContentError::InvalidDate {
        value: s.to_string(),
        reason: "not an ISO-8601 timestamp".to_string(),
    })
}

/// Format a date with a chrono format string
pub fn format_date<Z: TimeZone>(date: &DateTime<Z>, format: &str) -> String
where
    Z::Offset: std::fmt::Display,
{
    date.format(format).to_string()
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Z: TimeZone>(date: &DateTime<Z>) -> String
where
    Z::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Format date in full format (like "January 15, 2024")
pub fn full_date<Z: TimeZone>(date: &DateTime<Z>) -> String
where
    Z::Offset: std::fmt::Display,
{
    date.format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_rfc3339() {
        let parsed = parse_post_date("2016-03-14T21:43:34+01:00").unwrap();
        assert!(parsed.has_offset());
        let dt = parsed.resolve(Tz::UTC);
        assert_eq!(dt.offset().local_minus_utc(), 3600);
        assert_eq!(dt.hour(), 21);
    }

    #[test]
    fn test_parse_space_separated_with_offset() {
        let parsed = parse_post_date("2016-03-14 21:43:34 +0100").unwrap();
        assert!(parsed.has_offset());
    }

    #[test]
    fn test_parse_utc_suffix() {
        let parsed = parse_post_date("2017-01-02T08:00:00Z").unwrap();
        assert!(parsed.has_offset());
        assert_eq!(parsed.resolve(Tz::UTC).day(), 2);
    }

    #[test]
    fn test_naive_resolves_in_timezone() {
        let parsed = parse_post_date("2016-07-01 12:00:00").unwrap();
        assert!(!parsed.has_offset());
        let dt = parsed.resolve(chrono_tz::Europe::Paris);
        assert_eq!(dt.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(dt.hour(), 12);
    }

    #[test]
    fn test_date_only_is_naive() {
        let parsed = parse_post_date("2016-03-14").unwrap();
        assert_eq!(
            parsed,
            ParsedDate::Naive(
                NaiveDate::from_ymd_opt(2016, 3, 14)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_post_date("last tuesday").is_err());
        assert!(parse_post_date("2016-13-40T00:00:00+01:00").is_err());
        assert!(parse_post_date("   ").is_err());
    }

    #[test]
    fn test_formatting() {
        let dt = parse_post_date("2016-03-04T09:05:00+01:00")
            .unwrap()
            .resolve(Tz::UTC);
        assert_eq!(format_date(&dt, "%Y-%m-%d"), "2016-03-04");
        assert_eq!(date_xml(&dt), "2016-03-04T09:05:00+01:00");
        assert_eq!(full_date(&dt), "March 4, 2016");
    }
}
