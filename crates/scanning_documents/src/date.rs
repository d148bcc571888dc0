//! Dates as written by scanners, spreadsheets and form OCR.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

enum Layout {
    Date(&'static str),
    DateTime(&'static str),
}

/// Accepted layouts, tried in order. The first match wins.
const LAYOUTS: [Layout; 9] = [
    Layout::Date("%d/%m/%Y"),
    Layout::DateTime("%d/%m/%Y %H:%M:%S"),
    Layout::Date("%d-%m-%Y"),
    Layout::DateTime("%d-%m-%Y %H:%M:%S"),
    Layout::Date("%Y-%m-%d"),
    Layout::DateTime("%Y-%m-%d %H:%M:%S"),
    Layout::DateTime("%Y-%m-%dT%H:%M:%S"),
    // Banktec
    Layout::Date("%d%m%Y"),
    // Outgoing correspondence
    Layout::Date("%d %B %Y"),
];

/// Parse `value` with the first matching layout. Naive values are read as UTC.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    LAYOUTS.iter().find_map(|layout| parse_layout(value, layout))
}

fn parse_layout(value: &str, layout: &Layout) -> Option<DateTime<Utc>> {
    match layout {
        Layout::Date(fmt) => NaiveDate::parse_from_str(value, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc()),
        Layout::DateTime(fmt) => NaiveDateTime::parse_from_str(value, fmt)
            .ok()
            .map(|dt| dt.and_utc()),
    }
}

/// `ddmmyyyy`, used for dates of birth on EP2PG and LP1H.
pub fn parse_compact_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%d%m%Y").ok()
}

pub fn to_rfc3339(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Normalise a scan time to RFC 3339 UTC, falling back to `now` when it
/// matches no layout.
pub fn format_scan_time(value: &str, now: DateTime<Utc>) -> String {
    to_rfc3339(parse_date(value).unwrap_or(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_every_layout() {
        let cases = [
            ("26/09/2014", utc(2014, 9, 26, 0, 0, 0)),
            ("26/09/2014 12:38:53", utc(2014, 9, 26, 12, 38, 53)),
            ("26-09-2014", utc(2014, 9, 26, 0, 0, 0)),
            ("26-09-2014 12:38:53", utc(2014, 9, 26, 12, 38, 53)),
            ("2014-09-26", utc(2014, 9, 26, 0, 0, 0)),
            ("2014-09-26 12:38:53", utc(2014, 9, 26, 12, 38, 53)),
            ("2014-09-26T12:38:53", utc(2014, 9, 26, 12, 38, 53)),
            ("26092014", utc(2014, 9, 26, 0, 0, 0)),
            ("2 January 2006", utc(2006, 1, 2, 0, 0, 0)),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_date(input), Some(expected), "{input}");
        }
    }

    #[test]
    fn test_rejects_unknown_layouts() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2014/09/26"), None);
        assert_eq!(parse_date("31/02/2014"), None);
    }

    #[test]
    fn test_format_scan_time() {
        let now = utc(2024, 1, 1, 9, 0, 0);
        assert_eq!(format_scan_time("2014-09-26 12:38:53", now), "2014-09-26T12:38:53Z");
        assert_eq!(format_scan_time(" 26/09/2014 ", now), "2014-09-26T00:00:00Z");
        assert_eq!(format_scan_time("not a date", now), "2024-01-01T09:00:00Z");
    }

    #[test]
    fn test_compact_date() {
        assert_eq!(parse_compact_date("01021950"), NaiveDate::from_ymd_opt(1950, 2, 1));
        assert_eq!(parse_compact_date("1021950"), None);
        assert_eq!(parse_compact_date("32011950"), None);
    }
}
