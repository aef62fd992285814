use chrono::{NaiveDate, NaiveDateTime, Timelike};

use super::BusinessClock;
use crate::schedule::Schedule;

impl BusinessClock<'_> {
    /// Weekday that is not a holiday
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !Schedule::is_weekend(date) && !self.holidays.contains(date)
    }

    pub fn is_within_working_hours(&self, t: NaiveDateTime) -> bool {
        self.is_within_working_hours_at(t.hour(), t.minute())
    }

    /// Testable version: check a business-local hour/minute against the schedule.
    /// The whole lunch-start hour is closed; for lunches longer than one hour the
    /// last lunch hour is closed from minute 1 on.
    pub fn is_within_working_hours_at(&self, hour: u32, minute: u32) -> bool {
        let s = self.schedule;
        if hour < s.start() || hour >= s.end() {
            return false;
        }
        if hour == s.lunch_start() {
            return false;
        }
        if hour == s.lunch_end() - 1 && minute > 0 {
            return false;
        }
        true
    }

    /// Working day and open hour
    pub fn is_working_instant(&self, t: NaiveDateTime) -> bool {
        self.is_working_day(t.date()) && self.is_within_working_hours(t)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{date, local};
    use super::*;
    use crate::holidays::HolidayCalendar;

    fn with_clock<R>(holidays: &[&str], f: impl FnOnce(BusinessClock<'_>) -> R) -> R {
        let schedule = Schedule::default();
        let cal = HolidayCalendar::from_entries(holidays);
        f(BusinessClock::new(&schedule, &cal))
    }

    #[test]
    fn test_weekdays_are_working_days() {
        with_clock(&[], |clock| {
            // 2025-04-14 Monday .. 2025-04-18 Friday
            for d in ["2025-04-14", "2025-04-15", "2025-04-16", "2025-04-17", "2025-04-18"] {
                assert!(clock.is_working_day(date(d)), "{} should be a working day", d);
            }
        });
    }

    #[test]
    fn test_weekends_are_not_working_days() {
        with_clock(&[], |clock| {
            assert!(!clock.is_working_day(date("2025-04-12")));
            assert!(!clock.is_working_day(date("2025-04-13")));
        });
    }

    #[test]
    fn test_holidays_are_not_working_days() {
        with_clock(&["2025-04-17", "2025-04-18"], |clock| {
            assert!(!clock.is_working_day(date("2025-04-17")));
            assert!(!clock.is_working_day(date("2025-04-18")));
            assert!(clock.is_working_day(date("2025-04-16")));
        });
    }

    #[test]
    fn test_working_hours_boundaries() {
        with_clock(&[], |clock| {
            assert!(!clock.is_within_working_hours_at(7, 59));
            assert!(clock.is_within_working_hours_at(8, 0));
            assert!(clock.is_within_working_hours_at(11, 59));
            assert!(!clock.is_within_working_hours_at(12, 0));
            assert!(!clock.is_within_working_hours_at(12, 59));
            assert!(clock.is_within_working_hours_at(13, 0));
            assert!(clock.is_within_working_hours_at(16, 59));
            assert!(!clock.is_within_working_hours_at(17, 0));
            assert!(!clock.is_within_working_hours_at(23, 59));
        });
    }

    #[test]
    fn test_multi_hour_lunch_window() {
        // Lunch 12:00-14:00: hour 12 fully closed, hour 13 closed after minute 0
        let schedule = Schedule::new(8, 12, 14, 18).unwrap();
        let cal = HolidayCalendar::new();
        let clock = BusinessClock::new(&schedule, &cal);

        assert!(clock.is_within_working_hours_at(11, 59));
        assert!(!clock.is_within_working_hours_at(12, 30));
        assert!(clock.is_within_working_hours_at(13, 0));
        assert!(!clock.is_within_working_hours_at(13, 1));
        assert!(!clock.is_within_working_hours_at(13, 59));
        assert!(clock.is_within_working_hours_at(14, 0));
    }

    #[test]
    fn test_is_working_instant() {
        with_clock(&["2025-04-17"], |clock| {
            assert!(clock.is_working_instant(local("2025-04-15 09:30")));
            assert!(!clock.is_working_instant(local("2025-04-15 12:30")));
            assert!(!clock.is_working_instant(local("2025-04-17 09:30")));
            assert!(!clock.is_working_instant(local("2025-04-12 09:30")));
        });
    }
}


/// Kani formal verification proofs
#[cfg(kani)]
mod kani_proofs {
    use super::*;
    use crate::holidays::HolidayCalendar;

    #[kani::proof]
    fn open_hours_inside_schedule() {
        let hour: u32 = kani::any();
        kani::assume(hour < 24);
        let minute: u32 = kani::any();
        kani::assume(minute < 60);

        let schedule = Schedule::default();
        let cal = HolidayCalendar::new();
        let clock = BusinessClock::new(&schedule, &cal);

        if clock.is_within_working_hours_at(hour, minute) {
            kani::assert(hour >= 8 && hour < 17, "open hours must fall inside the day");
            kani::assert(hour != 12, "lunch hour must be closed");
        }
    }
}
