use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};

/// Calendar-day key (`YYYY-MM-DD`) of the given date in its own time zone.
pub fn day_key<D: Datelike>(date: &D) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// ISO-8601 week key (`YYYY-Www`).
///
/// The year is the ISO week-numbering year, so 2024-12-30 belongs to
/// `2025-W01` and 2021-01-01 to `2020-W53`. Week numbers are zero padded
/// so keys sort chronologically as plain strings.
pub fn week_key<D: Datelike>(date: &D) -> String {
    let week = date.iso_week();
    format!("{:04}-W{:02}", week.year(), week.week())
}

/// Monday of the ISO week containing `now`, in `now`'s own calendar.
pub fn week_start<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    let today = now.date_naive();
    today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn at(offset_hours: i32, y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(offset_hours * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_day_key_ignores_time_of_day() {
        assert_eq!(day_key(&at(0, 2025, 3, 9, 0, 0)), "2025-03-09");
        assert_eq!(day_key(&at(0, 2025, 3, 9, 23, 59)), "2025-03-09");
    }

    #[test]
    fn test_day_key_uses_local_calendar() {
        // 23:30 at UTC-5 is already the next day in UTC
        let local = at(-5, 2025, 3, 9, 23, 30);
        assert_eq!(day_key(&local), "2025-03-09");
        assert_eq!(day_key(&local.with_timezone(&Utc)), "2025-03-10");
    }

    #[test]
    fn test_week_key_stable_within_week() {
        // Monday through Sunday
        let keys: Vec<String> = (17..=23)
            .map(|d| week_key(&at(0, 2025, 2, d, 12, 0)))
            .collect();
        assert!(keys.iter().all(|k| k == "2025-W08"));
        assert_eq!(week_key(&at(0, 2025, 2, 24, 0, 0)), "2025-W09");
    }

    #[test]
    fn test_week_key_year_boundaries() {
        assert_eq!(week_key(&at(0, 2024, 12, 30, 8, 0)), "2025-W01");
        assert_eq!(week_key(&at(0, 2021, 1, 1, 8, 0)), "2020-W53");
        assert_eq!(week_key(&at(0, 2026, 1, 1, 8, 0)), "2026-W01");
    }

    #[test]
    fn test_week_keys_sort_chronologically() {
        let early = week_key(&at(0, 2025, 1, 8, 0, 0));
        let late = week_key(&at(0, 2025, 11, 8, 0, 0));
        assert!(early < late);
    }

    #[test]
    fn test_week_start_is_monday() {
        let sunday = at(0, 2025, 2, 23, 18, 0);
        assert_eq!(week_start(&sunday), NaiveDate::from_ymd_opt(2025, 2, 17).unwrap());
        let monday = at(0, 2025, 2, 17, 0, 1);
        assert_eq!(week_start(&monday), NaiveDate::from_ymd_opt(2025, 2, 17).unwrap());
    }
}
