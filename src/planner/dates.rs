//! Local-calendar-day arithmetic.
//!
//! All planning math counts calendar-day boundaries, never elapsed time,
//! so DST transitions cannot shift a plan by an hour.

use chrono::{Datelike, Duration, NaiveDate};

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// Whole calendar days from `from` to `to`; negative when `to` is earlier.
pub fn diff_days(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Index into the Monday-first availability vector: Monday = 0 .. Sunday = 6.
pub fn weekday_monday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

/// Calendar weekday as presented in day plans: Sunday = 0 .. Saturday = 6.
pub fn weekday_sunday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// The Monday on or before `date`; anchor for weekly summaries.
pub fn monday_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(weekday_monday_index(date) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_diff_days_counts_boundaries() {
        assert_eq!(diff_days(date("2026-01-01"), date("2026-03-12")), 70);
        assert_eq!(diff_days(date("2026-03-12"), date("2026-01-01")), -70);
        assert_eq!(diff_days(date("2026-01-01"), date("2026-01-01")), 0);
    }

    #[test]
    fn test_add_days_crosses_months() {
        assert_eq!(add_days(date("2026-01-30"), 3), date("2026-02-02"));
        assert_eq!(add_days(date("2026-02-28"), 1), date("2026-03-01"));
    }

    #[test]
    fn test_weekday_indices() {
        // 2026-01-01 is a Thursday
        let thursday = date("2026-01-01");
        assert_eq!(weekday_monday_index(thursday), 3);
        assert_eq!(weekday_sunday_index(thursday), 4);

        let sunday = date("2026-01-04");
        assert_eq!(weekday_monday_index(sunday), 6);
        assert_eq!(weekday_sunday_index(sunday), 0);
    }

    #[test]
    fn test_monday_of_week() {
        assert_eq!(monday_of_week(date("2026-01-01")), date("2025-12-29"));
        assert_eq!(monday_of_week(date("2026-01-05")), date("2026-01-05"));
        assert_eq!(monday_of_week(date("2026-01-04")), date("2025-12-29"));
    }
}
