//! Tolerant timestamp parsing for tabular event data

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

/// Naive date-time layouts tried after the offset-aware ones (interpreted as UTC).
///
/// Slash dates are read month-first, like most spreadsheet exports.
const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%F %T%.f",
    "%FT%T%.f",
    "%F %H:%M",
    "%FT%H:%M",
    "%F %T UTC",
    "%Y/%m/%d %T%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %T%.f",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts (midnight UTC).
const NAIVE_DATE_FORMATS: &[&str] = &["%F", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a timestamp cell into a `DateTime<FixedOffset>`, trying multiple formats.
///
/// Returns `None` when no format matches; callers treat such values as invalid
/// and drop the row instead of substituting a default.
///
/// # Supported Formats (in order of precedence)
/// 1. Custom format (if provided) - tries both with timezone and as naive (assumes UTC)
/// 2. RFC3339: `2023-10-06T09:30:21+00:00`
/// 3. ISO 8601 with offset (no colon): `2023-10-06T09:30:21+0000`
/// 4. Space separated with offset: `2023-10-06 09:30:21+02:00`
/// 5. RFC2822: `Fri, 06 Oct 2023 09:30:21 +0000`
/// 6. Naive date-times from [`NAIVE_DATE_TIME_FORMATS`] (assumes UTC)
/// 7. Dates from [`NAIVE_DATE_FORMATS`] (midnight, assumes UTC)
/// 8. GMT format: `Mon Apr 03 2023 12:08:18 GMT+0200 (...)` (timezone part parsed)
///
/// Surrounding whitespace is ignored.
pub fn parse_timestamp(time: &str, custom_format: Option<&str>) -> Option<DateTime<FixedOffset>> {
    let time = time.trim();
    if time.is_empty() {
        return None;
    }

    if let Some(date_format) = custom_format {
        if let Ok(dt) = DateTime::parse_from_str(time, date_format) {
            return Some(dt);
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(time, date_format) {
            return Some(dt.and_utc().into());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(time) {
        return Some(dt);
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f%z", "%F %T%.f%z", "%F %T%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(time, format) {
            return Some(dt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(time) {
        return Some(dt);
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(time, format) {
            return Some(dt.and_utc().into());
        }
    }

    for format in NAIVE_DATE_FORMATS {
        if let Some(dt) = NaiveDate::parse_from_str(time, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Some(dt.and_utc().into());
        }
    }

    // Browser exports: "Mon Apr 03 2023 12:08:18 GMT+0200 (Mitteleuropäische Sommerzeit)"
    // The weekday and the trailing zone name are ignored
    if let Ok((dt, _)) = DateTime::parse_and_remainder(time, "%Z %b %d %Y %T GMT%z") {
        return Some(dt);
    }

    None
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap().into()
    }

    #[test]
    fn test_rfc3339() {
        let result = parse_timestamp("2023-10-06T09:30:21+00:00", None);
        assert_eq!(result, Some(utc(2023, 10, 6, 9, 30, 21)));
    }

    #[test]
    fn test_offset_is_respected() {
        let result = parse_timestamp("2023-10-06 11:30:21+02:00", None).unwrap();
        assert_eq!(result, utc(2023, 10, 6, 9, 30, 21));
    }

    #[test]
    fn test_naive_datetime() {
        assert!(parse_timestamp("2023-10-06 09:30:21.890421", None).is_some());
        assert_eq!(
            parse_timestamp("2023-10-06T09:30:21", None),
            Some(utc(2023, 10, 6, 9, 30, 21))
        );
    }

    #[test]
    fn test_without_seconds() {
        assert_eq!(
            parse_timestamp("2023-10-06 09:30", None),
            Some(utc(2023, 10, 6, 9, 30, 0))
        );
    }

    #[test]
    fn test_month_first_and_date_only() {
        assert_eq!(
            parse_timestamp("10/06/2023 09:30:21", None),
            Some(utc(2023, 10, 6, 9, 30, 21))
        );
        assert_eq!(
            parse_timestamp("2023-10-06", None),
            Some(utc(2023, 10, 6, 0, 0, 0))
        );
        assert_eq!(
            parse_timestamp(" 2023/10/06 ", None),
            Some(utc(2023, 10, 6, 0, 0, 0))
        );
    }

    #[test]
    fn test_custom_format() {
        let result = parse_timestamp("06.10.2023 09:30:21", Some("%d.%m.%Y %H:%M:%S"));
        assert_eq!(result, Some(utc(2023, 10, 6, 9, 30, 21)));
    }

    #[test]
    fn test_gmt_format() {
        let result = parse_timestamp(
            "Mon Apr 03 2023 12:08:18 GMT+0200 (Mitteleuropäische Sommerzeit)",
            None,
        );
        assert_eq!(result, Some(utc(2023, 4, 3, 10, 8, 18)));
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(parse_timestamp("", None), None);
        assert_eq!(parse_timestamp("yesterday", None), None);
        assert_eq!(parse_timestamp("2023-13-45 10:00", None), None);
    }
}
