//! Date formatting helpers
//!
//! All formats are locale-invariant so a site builds the same on any host.

use chrono::NaiveDateTime;

/// Long form used in listings and post headers, e.g. "February 05, 2025".
pub fn month_day_year(date: &NaiveDateTime) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Compact form for `<time datetime=...>` attributes, e.g. "2025-02-05".
pub fn iso_date(date: &NaiveDateTime) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// RFC 3339 with the naive time read as UTC, for feed timestamps.
pub fn rfc3339_utc(date: &NaiveDateTime) -> String {
    date.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 5)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_month_day_year() {
        assert_eq!(month_day_year(&sample()), "February 05, 2025");
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(iso_date(&sample()), "2025-02-05");
    }

    #[test]
    fn test_rfc3339_utc() {
        assert_eq!(rfc3339_utc(&sample()), "2025-02-05T10:30:00Z");
    }
}
