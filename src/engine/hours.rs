use chrono::{Days, Duration, NaiveDateTime, Timelike};

use super::BusinessClock;
use crate::schedule::Schedule;

impl BusinessClock<'_> {
    /// Advance by `n` working hours, minute by minute through the open blocks.
    ///
    /// Nights, weekends, holidays and lunch are skipped. Landing exactly on a
    /// block's closing boundary is allowed and is not pushed to the next block.
    /// `None` if the hours run past `NaiveDate::MAX`.
    pub fn add_working_hours(&self, t: NaiveDateTime, n: u32) -> Option<NaiveDateTime> {
        let mut remaining = i64::from(n) * 60;
        if remaining == 0 {
            return Some(t);
        }

        let s = self.schedule;
        let mut current = t;

        while remaining > 0 {
            current = self.forward_to_open(current)?;

            let hour = current.hour();
            let in_morning = hour < s.lunch_start();
            let boundary = if in_morning { s.lunch_start() } else { s.end() };
            let available = i64::from((boundary - hour) * 60 - current.minute());

            if remaining <= available {
                current += Duration::minutes(remaining);
                remaining = 0;
            } else {
                remaining -= available;
                current = if in_morning {
                    Schedule::at(current.date(), s.lunch_end())
                } else {
                    self.next_day_open(current)?
                };
            }
        }

        Some(current)
    }

    /// Push `t` forward until it sits inside an open block
    fn forward_to_open(&self, mut t: NaiveDateTime) -> Option<NaiveDateTime> {
        let s = self.schedule;
        loop {
            let hour = t.hour();
            if !self.is_working_day(t.date()) || hour >= s.end() {
                t = self.next_day_open(t)?;
            } else if hour < s.start() {
                t = Schedule::at(t.date(), s.start());
            } else if hour >= s.lunch_start() && hour < s.lunch_end() {
                t = Schedule::at(t.date(), s.lunch_end());
            } else {
                return Some(t);
            }
        }
    }

    fn next_day_open(&self, t: NaiveDateTime) -> Option<NaiveDateTime> {
        let date = t.date().checked_add_days(Days::new(1))?;
        Some(Schedule::at(date, self.schedule.start()))
    }
}
