use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::domain::payroll::round_cents;
use crate::model::time_entry::TimeEntry;

/// Hours per day paid at the regular rate.
pub const DAILY_REGULAR_HOURS: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hours {
    pub total: f64,
    pub regular: f64,
    pub overtime: f64,
}

impl Hours {
    pub const ZERO: Hours = Hours {
        total: 0.0,
        regular: 0.0,
        overtime: 0.0,
    };

    /// Splits `total` at `threshold` into regular and overtime.
    pub fn split(total: f64, threshold: f64) -> Self {
        let total = round_cents(total);
        let regular = total.min(threshold);
        Hours {
            total,
            regular: round_cents(regular),
            overtime: round_cents(total - regular),
        }
    }
}

/// Places a clock time on the shift that started at `clock_in` on `date`.
/// Times earlier than the clock-in fall on the following day.
pub fn on_shift(date: NaiveDate, clock_in: NaiveTime, at: NaiveTime) -> NaiveDateTime {
    let day = if at < clock_in { date + Duration::days(1) } else { date };
    day.and_time(at)
}

/// Hours worked between two instants. Breaks are recorded but not
/// deducted. `None` when `end` precedes `start`.
pub fn shift_hours(start: NaiveDateTime, end: NaiveDateTime) -> Option<Hours> {
    if end < start {
        return None;
    }
    let minutes = (end - start).num_minutes() as f64;
    Some(Hours::split(minutes / 60.0, DAILY_REGULAR_HOURS))
}

/// Hours of an entry from its stored times; a clock-out earlier than the
/// clock-in ends the next day.
pub fn entry_hours(date: NaiveDate, clock_in: NaiveTime, clock_out: NaiveTime) -> Hours {
    let start = date.and_time(clock_in);
    shift_hours(start, on_shift(date, clock_in, clock_out)).unwrap_or(Hours::ZERO)
}

pub fn week_end(week_start: NaiveDate) -> NaiveDate {
    week_start + Duration::days(6)
}

/// Weekly totals over closed entries, with overtime above `threshold`.
pub fn week_hours<'a, I>(entries: I, threshold: f64) -> Hours
where
    I: IntoIterator<Item = &'a TimeEntry>,
{
    let total: f64 = entries
        .into_iter()
        .filter(|e| !e.is_open())
        .map(|e| e.total_hours)
        .sum();
    Hours::split(total, threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixtures;

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    #[test]
    fn long_day_spills_into_overtime() {
        let hours = entry_hours(day(), t("09:00"), t("17:30"));
        assert_eq!(hours, Hours { total: 8.5, regular: 8.0, overtime: 0.5 });
    }

    #[test]
    fn short_day_is_all_regular() {
        let hours = entry_hours(day(), t("09:00"), t("16:30"));
        assert_eq!(hours, Hours { total: 7.5, regular: 7.5, overtime: 0.0 });
    }

    #[test]
    fn night_shift_ends_the_next_day() {
        let hours = entry_hours(day(), t("22:00"), t("01:00"));
        assert_eq!(hours, Hours { total: 3.0, regular: 3.0, overtime: 0.0 });

        let next = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(on_shift(day(), t("22:00"), t("01:00")), next.and_time(t("01:00")));
        assert_eq!(on_shift(day(), t("22:00"), t("23:00")), day().and_time(t("23:00")));
    }

    #[test]
    fn shift_hours_spans_whole_days() {
        let start = day().and_time(t("18:00"));
        let end = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap().and_time(t("08:00"));
        assert_eq!(shift_hours(start, end).unwrap().total, 38.0);
        assert!(shift_hours(end, start).is_none());
    }

    #[test]
    fn week_end_is_six_days_later() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(week_end(start), NaiveDate::from_ymd_opt(2024, 1, 21).unwrap());
    }

    #[test]
    fn weekly_overtime_uses_threshold() {
        let f = Fixtures::load("x").unwrap();
        let johns: Vec<&TimeEntry> = f.time_entries.iter().filter(|e| e.employee_id == 1).collect();

        // 8.5 + 9.5
        assert_eq!(week_hours(johns.iter().copied(), 40.0), Hours { total: 18.0, regular: 18.0, overtime: 0.0 });
        assert_eq!(week_hours(johns.iter().copied(), 10.0), Hours { total: 18.0, regular: 10.0, overtime: 8.0 });
    }

    #[test]
    fn seeded_entries_match_the_rule() {
        let f = Fixtures::load("x").unwrap();
        for entry in &f.time_entries {
            let out = entry.clock_out.unwrap();
            let hours = entry_hours(entry.date, entry.clock_in, out);
            assert_eq!(hours.total, entry.total_hours, "entry {}", entry.id);
            assert_eq!(hours.regular, entry.regular_hours, "entry {}", entry.id);
        }
    }
}
