//! Calendar-day filtering of dated records
//!
//! All calendar arithmetic happens in one configured timezone, so a record
//! belongs to exactly one day regardless of where the terminal runs.

use crate::model::expense::Dated;
use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use chrono_tz::Tz;

/// Convert epoch milliseconds into a local date-time, if representable
pub fn local_datetime(millis: i64, tz: &Tz) -> Option<DateTime<Tz>> {
    tz.timestamp_millis_opt(millis).single()
}

/// Calendar day of an instant in `tz`
pub fn local_date(millis: i64, tz: &Tz) -> Option<NaiveDate> {
    local_datetime(millis, tz).map(|dt| dt.date_naive())
}

/// Records on the same calendar day as `target_millis`, newest first
///
/// Ties keep their input order. Records whose timestamp cannot be
/// represented never match.
pub fn filter_by_day<T: Dated + Clone>(records: &[T], target_millis: i64, tz: &Tz) -> Vec<T> {
    let Some(target) = local_date(target_millis, tz) else {
        return Vec::new();
    };

    let mut matching: Vec<T> = records
        .iter()
        .filter(|r| local_date(r.timestamp_millis(), tz) == Some(target))
        .cloned()
        .collect();

    matching.sort_by(|a, b| b.timestamp_millis().cmp(&a.timestamp_millis()));
    matching
}

/// Midnight of the instant's calendar day
pub fn start_of_day(millis: i64, tz: &Tz) -> Option<i64> {
    let date = local_date(millis, tz)?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

/// Midnight of the day `delta_days` away from the instant's day
pub fn shift_day(millis: i64, delta_days: i64, tz: &Tz) -> i64 {
    let shifted = local_date(millis, tz)
        .and_then(|date| date.checked_add_signed(Duration::days(delta_days)))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|midnight| tz.from_local_datetime(&midnight).earliest())
        .map(|dt| dt.timestamp_millis());

    shifted.unwrap_or_else(|| millis.saturating_add(delta_days.saturating_mul(86_400_000)))
}

/// The calendar day of `day_millis` combined with the time of day of `now_millis`
pub fn instant_on_day(day_millis: i64, now_millis: i64, tz: &Tz) -> i64 {
    let combined = local_date(day_millis, tz)
        .zip(local_datetime(now_millis, tz))
        .and_then(|(date, now)| tz.from_local_datetime(&date.and_time(now.time())).earliest())
        .map(|dt| dt.timestamp_millis());

    combined.unwrap_or(day_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::expense::sample;
    use chrono_tz::Asia::Seoul;

    /// 2024-03-05 12:00:00 in Seoul (03:00 UTC)
    const NOON_MAR_5: i64 = 1_709_607_600_000;
    const HOUR: i64 = 3_600_000;

    #[test]
    fn test_empty_input_yields_empty_output() {
        let records: Vec<crate::model::expense::ExpenseWithCategory> = Vec::new();
        assert!(filter_by_day(&records, NOON_MAR_5, &Seoul).is_empty());
    }

    #[test]
    fn test_keeps_same_day_sorted_newest_first() {
        let records = vec![
            sample(1, "morning", 1_000, NOON_MAR_5 - 5 * HOUR),
            sample(2, "yesterday", 2_000, NOON_MAR_5 - 13 * HOUR),
            sample(3, "evening", 3_000, NOON_MAR_5 + 9 * HOUR),
            sample(4, "tomorrow", 4_000, NOON_MAR_5 + 12 * HOUR),
            sample(5, "noon", 5_000, NOON_MAR_5),
        ];

        let day = filter_by_day(&records, NOON_MAR_5, &Seoul);
        let names: Vec<&str> = day.iter().map(|e| e.product_name.as_str()).collect();
        assert_eq!(names, vec!["evening", "noon", "morning"]);
        assert!(day.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[test]
    fn test_day_boundary_uses_configured_timezone() {
        // 2024-03-04 23:30 UTC is already 2024-03-05 08:30 in Seoul
        let late_utc = NOON_MAR_5 - 3 * HOUR - 30 * 60_000;
        let records = vec![sample(1, "early", 100, late_utc)];

        assert_eq!(filter_by_day(&records, NOON_MAR_5, &Seoul).len(), 1);
        assert!(filter_by_day(&records, NOON_MAR_5, &chrono_tz::UTC).is_empty());
    }

    #[test]
    fn test_identical_timestamps_are_all_kept() {
        let records = vec![
            sample(1, "a", 1, NOON_MAR_5),
            sample(2, "b", 1, NOON_MAR_5),
            sample(3, "c", 1, NOON_MAR_5),
        ];
        assert_eq!(filter_by_day(&records, NOON_MAR_5, &Seoul).len(), 3);
    }

    #[test]
    fn test_unrepresentable_timestamp_never_matches() {
        let records = vec![sample(1, "broken", 1, i64::MAX)];
        assert!(filter_by_day(&records, NOON_MAR_5, &Seoul).is_empty());
        assert!(filter_by_day(&records, i64::MAX, &Seoul).is_empty());
    }

    #[test]
    fn test_shift_and_start_of_day() {
        let midnight = start_of_day(NOON_MAR_5, &Seoul).unwrap();
        assert_eq!(midnight, NOON_MAR_5 - 12 * HOUR);

        let next = shift_day(NOON_MAR_5, 1, &Seoul);
        assert_eq!(next, midnight + 24 * HOUR);

        let prev = shift_day(NOON_MAR_5, -1, &Seoul);
        assert_eq!(prev, midnight - 24 * HOUR);
    }

    #[test]
    fn test_instant_on_day_keeps_time_of_day() {
        let now = NOON_MAR_5 + 2 * 24 * HOUR + HOUR;
        let combined = instant_on_day(NOON_MAR_5, now, &Seoul);
        assert_eq!(combined, NOON_MAR_5 + HOUR);
    }
}
