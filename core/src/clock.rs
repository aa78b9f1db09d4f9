//! Planning clock: the single reference date a projection is measured from.
//!
//! RULE: "today" is read once, when the clock is built.
//! Every week boundary, ramp offset and readiness check in a
//! projection is a day-count offset from that one date.

use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::WeekIndex;

pub const DAYS_PER_WEEK: i64 = 7;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanningClock {
    pub today: NaiveDate,
}

impl PlanningClock {
    /// Capture the local calendar date once.
    pub fn now() -> Self {
        Self { today: Local::now().date_naive() }
    }

    /// Pin the clock to a fixed date (tests, snapshot restores, replays).
    pub fn fixed(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Calendar date of week `week`, counted from today.
    pub fn week_date(&self, week: WeekIndex) -> NaiveDate {
        self.today + Duration::days(week as i64 * DAYS_PER_WEEK)
    }
}

/// Signed whole days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// `ceil(days / 7)` for non-negative day counts, 0 for negative ones.
pub fn weeks_ceil(days: i64) -> u32 {
    if days <= 0 {
        return 0;
    }
    ((days + DAYS_PER_WEEK - 1) / DAYS_PER_WEEK) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_dates_step_by_seven_days() {
        let clock = PlanningClock::fixed(date(2026, 10, 18));
        assert_eq!(clock.week_date(0), date(2026, 10, 18));
        assert_eq!(clock.week_date(1), date(2026, 10, 25));
        assert_eq!(clock.week_date(12), date(2027, 1, 10));
    }

    #[test]
    fn weeks_ceil_rounds_partial_weeks_up() {
        assert_eq!(weeks_ceil(-3), 0);
        assert_eq!(weeks_ceil(0), 0);
        assert_eq!(weeks_ceil(1), 1);
        assert_eq!(weeks_ceil(7), 1);
        assert_eq!(weeks_ceil(8), 2);
        assert_eq!(weeks_ceil(21), 3);
    }

    #[test]
    fn days_between_is_signed() {
        assert_eq!(days_between(date(2026, 1, 10), date(2026, 1, 3)), -7);
        assert_eq!(days_between(date(2026, 1, 3), date(2026, 1, 10)), 7);
    }
}
