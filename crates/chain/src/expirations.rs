use crate::error::ChainError;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use core_types::CoreError;
use std::collections::BTreeSet;

/// Whole calendar days from `today` to `expiration`; negative for past dates.
pub fn days_to_expiration(today: NaiveDate, expiration: NaiveDate) -> i64 {
    (expiration - today).num_days()
}

/// The first Friday strictly after `date`.
fn next_friday(date: NaiveDate) -> NaiveDate {
    let days_ahead = (Weekday::Fri.num_days_from_monday() + 7 - date.weekday().num_days_from_monday()) % 7;
    let days_ahead = if days_ahead == 0 { 7 } else { days_ahead };
    date + Duration::days(i64::from(days_ahead))
}

/// The standard monthly expiration: third Friday of the month.
pub fn third_friday(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, Weekday::Fri, 3)
}

/// Builds the expiration calendar for a DTE window.
///
/// Weekly Fridays are listed up to `weekly_horizon_days` out and monthly (third Friday)
/// expirations up to `max_dte`. The result is sorted, unique and strictly after `today`;
/// it may be empty.
pub fn expiration_schedule(
    today: NaiveDate,
    min_dte: u32,
    max_dte: u32,
    weekly_horizon_days: u32,
) -> Result<Vec<NaiveDate>, ChainError> {
    if min_dte > max_dte {
        return Err(CoreError::InvalidRange {
            field: "dte",
            min: min_dte.to_string(),
            max: max_dte.to_string(),
        }
        .into());
    }

    let max_dte = i64::from(max_dte);
    let lowest_dte = i64::from(min_dte.max(1));
    let weekly_limit = max_dte.min(i64::from(weekly_horizon_days));
    let mut dates = BTreeSet::new();

    let mut friday = next_friday(today);
    while days_to_expiration(today, friday) <= weekly_limit {
        dates.insert(friday);
        friday += Duration::days(7);
    }

    let (mut year, mut month) = (today.year(), today.month());
    loop {
        let Some(monthly) = third_friday(year, month) else {
            break;
        };
        let dte = days_to_expiration(today, monthly);
        // The third Friday is never later than the 21st, so once the 1st of the month
        // is past the window nothing further can qualify.
        if dte - 20 > max_dte {
            break;
        }
        if dte >= 1 && dte <= max_dte {
            dates.insert(monthly);
        }
        (year, month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    }

    Ok(dates
        .into_iter()
        .filter(|d| {
            let dte = days_to_expiration(today, *d);
            dte >= lowest_dte && dte <= max_dte
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn third_fridays() {
        assert_eq!(third_friday(2026, 1), Some(date(2026, 1, 16)));
        assert_eq!(third_friday(2026, 2), Some(date(2026, 2, 20)));
        assert_eq!(third_friday(2026, 4), Some(date(2026, 4, 17)));
    }

    #[test]
    fn weeklies_and_monthlies_merge_without_duplicates() {
        // Monday 2026-01-05.
        let schedule = expiration_schedule(date(2026, 1, 5), 0, 60, 45).unwrap();
        assert_eq!(
            schedule,
            vec![
                date(2026, 1, 9),
                date(2026, 1, 16),
                date(2026, 1, 23),
                date(2026, 1, 30),
                date(2026, 2, 6),
                date(2026, 2, 13),
                date(2026, 2, 20),
            ]
        );
    }

    #[test]
    fn long_windows_only_add_monthlies() {
        let schedule = expiration_schedule(date(2026, 1, 5), 50, 110, 45).unwrap();
        assert_eq!(schedule, vec![date(2026, 3, 20), date(2026, 4, 17)]);
    }

    #[test]
    fn expirations_are_strictly_in_the_future() {
        // Friday 2026-01-09: today's expiration is excluded even with min_dte = 0.
        let today = date(2026, 1, 9);
        let schedule = expiration_schedule(today, 0, 10, 45).unwrap();
        assert_eq!(schedule, vec![date(2026, 1, 16)]);
        assert!(schedule.iter().all(|d| *d > today));
    }

    #[test]
    fn empty_window_is_not_an_error() {
        // No Friday falls exactly 1 day after a Monday.
        let schedule = expiration_schedule(date(2026, 1, 5), 1, 1, 45).unwrap();
        assert!(schedule.is_empty());
    }

    #[test]
    fn inverted_window_is_rejected() {
        let err = expiration_schedule(date(2026, 1, 5), 30, 10, 45).unwrap_err();
        assert!(matches!(err, ChainError::Validation(CoreError::InvalidRange { .. })));
    }

    #[test]
    fn year_boundary() {
        let schedule = expiration_schedule(date(2026, 12, 21), 20, 40, 0).unwrap();
        assert_eq!(schedule, vec![date(2027, 1, 15)]);
    }
}
