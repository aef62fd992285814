use chrono::{Days, NaiveDateTime, Timelike};

use super::BusinessClock;
use crate::schedule::Schedule;

impl BusinessClock<'_> {
    /// Move `t` backward to the nearest working instant at or before it.
    ///
    /// Non-working days and early mornings collapse to the previous working
    /// day's closing time; evenings collapse to the same day's closing time;
    /// the lunch window collapses to its start. Never moves forward.
    /// `None` if no working day exists between `t` and `NaiveDate::MIN`.
    pub fn snap(&self, t: NaiveDateTime) -> Option<NaiveDateTime> {
        let end = self.schedule.end();
        let mut adjusted = self.back_to_working_day(t)?;

        let hour = adjusted.hour();
        if hour >= end {
            adjusted = Schedule::at(adjusted.date(), end);
        } else if hour < self.schedule.start() {
            adjusted = self.back_to_working_day(self.previous_day_close(adjusted)?)?;
        } else if hour >= self.schedule.lunch_start() && hour < self.schedule.lunch_end() {
            adjusted = Schedule::at(adjusted.date(), self.schedule.lunch_start());
        }

        Some(adjusted)
    }

    /// Step back to the previous day's closing time until the date is worked
    fn back_to_working_day(&self, mut t: NaiveDateTime) -> Option<NaiveDateTime> {
        while !self.is_working_day(t.date()) {
            t = self.previous_day_close(t)?;
        }
        Some(t)
    }

    fn previous_day_close(&self, t: NaiveDateTime) -> Option<NaiveDateTime> {
        let date = t.date().checked_sub_days(Days::new(1))?;
        Some(Schedule::at(date, self.schedule.end()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::local;
    use super::*;
    use crate::holidays::HolidayCalendar;
    use chrono::NaiveDate;

    fn snap_with(holidays: &[&str], t: &str) -> NaiveDateTime {
        let schedule = Schedule::default();
        let cal = HolidayCalendar::from_entries(holidays);
        BusinessClock::new(&schedule, &cal).snap(local(t)).unwrap()
    }

    #[test]
    fn test_working_instant_unchanged() {
        assert_eq!(snap_with(&[], "2025-04-15 09:45:12"), local("2025-04-15 09:45:12"));
        assert_eq!(snap_with(&[], "2025-04-15 13:00"), local("2025-04-15 13:00"));
        assert_eq!(snap_with(&[], "2025-04-15 16:59:59"), local("2025-04-15 16:59:59"));
    }

    #[test]
    fn test_saturday_goes_to_friday_close() {
        assert_eq!(snap_with(&[], "2025-04-12 15:00"), local("2025-04-11 17:00"));
    }

    #[test]
    fn test_sunday_morning_goes_to_friday_close() {
        assert_eq!(snap_with(&[], "2025-04-13 06:00"), local("2025-04-11 17:00"));
    }

    #[test]
    fn test_evening_goes_to_same_day_close() {
        assert_eq!(snap_with(&[], "2025-04-15 19:30"), local("2025-04-15 17:00"));
        assert_eq!(snap_with(&[], "2025-04-15 17:00:01"), local("2025-04-15 17:00"));
    }

    #[test]
    fn test_early_morning_goes_to_previous_day_close() {
        assert_eq!(snap_with(&[], "2025-04-15 07:59"), local("2025-04-14 17:00"));
    }

    #[test]
    fn test_monday_early_morning_skips_weekend() {
        assert_eq!(snap_with(&[], "2025-04-14 05:00"), local("2025-04-11 17:00"));
    }

    #[test]
    fn test_early_morning_after_holiday_skips_it() {
        // Thursday 17 and Friday 18 April 2025 are holidays
        let holidays = ["2025-04-17", "2025-04-18"];
        assert_eq!(snap_with(&holidays, "2025-04-21 07:00"), local("2025-04-16 17:00"));
    }

    #[test]
    fn test_holiday_goes_to_previous_working_close() {
        assert_eq!(snap_with(&["2025-04-15"], "2025-04-15 10:00"), local("2025-04-14 17:00"));
    }

    #[test]
    fn test_lunch_goes_to_lunch_start() {
        assert_eq!(snap_with(&[], "2025-04-15 12:30"), local("2025-04-15 12:00"));
        assert_eq!(snap_with(&[], "2025-04-15 12:59:59"), local("2025-04-15 12:00"));
    }

    #[test]
    fn test_multi_hour_lunch_collapses_to_start() {
        let schedule = Schedule::new(8, 12, 14, 18).unwrap();
        let cal = HolidayCalendar::new();
        let clock = BusinessClock::new(&schedule, &cal);
        assert_eq!(clock.snap(local("2025-04-15 13:30")), Some(local("2025-04-15 12:00")));
        assert_eq!(clock.snap(local("2025-04-15 14:00")), Some(local("2025-04-15 14:00")));
    }

    #[test]
    fn test_first_representable_day_has_nothing_before_it() {
        let schedule = Schedule::default();
        let cal = HolidayCalendar::new();
        let clock = BusinessClock::new(&schedule, &cal);

        // Early morning (or a weekend) on the first date cannot fall back a day
        assert_eq!(clock.snap(Schedule::at(NaiveDate::MIN, 6)), None);
        // The day after still snaps within range when it is worked
        let next = NaiveDate::MIN + Days::new(1);
        if clock.is_working_day(next) {
            assert_eq!(clock.snap(Schedule::at(next, 10)), Some(Schedule::at(next, 10)));
        }
    }
}
