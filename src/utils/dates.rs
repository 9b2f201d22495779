use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// `[start, end)` of a calendar day.
pub fn day_bounds(day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = day.and_time(NaiveTime::MIN);
    (start, start + Duration::days(1))
}

/// Every calendar day from `start` to `end`, both inclusive.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Number of days in the inclusive range; 0 when `end < start`.
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    ((end - start).num_days() + 1).max(0)
}

pub fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Month/day of `date` placed in `year`; Feb 29 becomes Feb 28 in common years.
pub fn in_year(date: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28))
        .unwrap_or(date)
}

/// First occurrence of `date`'s month/day on or after `from`.
pub fn next_anniversary(date: NaiveDate, from: NaiveDate) -> NaiveDate {
    let this_year = in_year(date, from.year());
    if this_year >= from {
        this_year
    } else {
        in_year(date, from.year() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn range_is_inclusive() {
        let days: Vec<_> = days_inclusive(d("2024-06-28"), d("2024-07-02")).collect();
        assert_eq!(days.len(), 5);
        assert_eq!(days.first(), Some(&d("2024-06-28")));
        assert_eq!(days.last(), Some(&d("2024-07-02")));
        assert_eq!(inclusive_day_count(d("2024-06-28"), d("2024-07-02")), 5);
    }

    #[test]
    fn single_day_range() {
        assert_eq!(days_inclusive(d("2024-06-10"), d("2024-06-10")).count(), 1);
        assert_eq!(inclusive_day_count(d("2024-06-11"), d("2024-06-10")), 0);
    }

    #[test]
    fn weekend_detection() {
        assert!(is_weekend(d("2024-06-08")));
        assert!(is_weekend(d("2024-06-09")));
        assert!(!is_weekend(d("2024-06-10")));
    }

    #[test]
    fn day_bounds_cover_one_day() {
        let (start, end) = day_bounds(d("2024-06-10"));
        assert_eq!(start.to_string(), "2024-06-10 00:00:00");
        assert_eq!(end.to_string(), "2024-06-11 00:00:00");
    }

    #[test]
    fn anniversary_rolls_to_next_year_once_passed() {
        assert_eq!(next_anniversary(d("1990-06-20"), d("2024-06-10")), d("2024-06-20"));
        assert_eq!(next_anniversary(d("1990-06-10"), d("2024-06-10")), d("2024-06-10"));
        assert_eq!(next_anniversary(d("1990-01-05"), d("2024-06-10")), d("2025-01-05"));
    }

    #[test]
    fn leap_day_falls_back_to_feb_28() {
        assert_eq!(next_anniversary(d("2000-02-29"), d("2025-01-01")), d("2025-02-28"));
        assert_eq!(next_anniversary(d("2000-02-29"), d("2024-01-01")), d("2024-02-29"));
    }
}
