// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time conversion.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};

pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
const MILLIS_PER_DAY: i64 = SECONDS_PER_DAY * 1000;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format Unix epoch seconds as RFC3339, falling back to the raw number.
pub fn format_epoch(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(format_utc_rfc3339)
        .unwrap_or_else(|| secs.to_string())
}

/// Calendar date an RFC3339 instant falls on as seen from `tz`.
pub fn local_date<Tz: TimeZone>(
    instant: &str,
    tz: &Tz,
) -> Result<NaiveDate, chrono::ParseError> {
    let parsed = DateTime::parse_from_rfc3339(instant)?;
    Ok(parsed.with_timezone(tz).date_naive())
}

/// Whole days from `now` until the start of `date`, rounded up.
///
/// Computed on wall-clock time in `now`'s zone, so a DST shift never turns a
/// calendar day into 23 or 25 hours. Negative once `date` has passed.
pub fn ceil_days_until<Tz: TimeZone>(date: NaiveDate, now: &DateTime<Tz>) -> i64 {
    let millis = (date.and_time(NaiveTime::MIN) - now.naive_local()).num_milliseconds();
    -(-millis).div_euclid(MILLIS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_local_date_shifts_across_midnight() {
        let pacific = FixedOffset::west_opt(8 * 3600).unwrap();
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();

        let instant = "2024-01-02T03:00:00Z";

        assert_eq!(
            local_date(instant, &pacific).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(
            local_date(instant, &tokyo).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
        assert_eq!(
            local_date(instant, &Utc).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }

    #[test]
    fn test_local_date_rejects_garbage() {
        assert!(local_date("yesterday-ish", &Utc).is_err());
        assert!(local_date("2024-01-02", &Utc).is_err());
    }

    #[test]
    fn test_ceil_days_until_rounds_up_partial_days() {
        let to = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 8, 12, 0, 0).unwrap();
        assert_eq!(ceil_days_until(to, &now), 2);

        let midnight = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
        assert_eq!(ceil_days_until(to, &midnight), 2);
    }

    #[test]
    fn test_ceil_days_until_negative_after_end() {
        let to = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();

        let later_same_day = Utc.with_ymd_and_hms(2024, 1, 10, 18, 0, 0).unwrap();
        assert_eq!(ceil_days_until(to, &later_same_day), 0);

        let days_later = Utc.with_ymd_and_hms(2024, 1, 13, 6, 0, 0).unwrap();
        assert_eq!(ceil_days_until(to, &days_later), -3);
    }

    #[test]
    fn test_format_epoch() {
        assert_eq!(format_epoch(1_704_067_200), "2024-01-01T00:00:00Z");
    }
}
