//! Business-time arithmetic
//!
//! Every function here works on business-local wall-clock values
//! (`NaiveDateTime` in the business timezone). Conversion to and from UTC
//! happens in [`crate::timezone`], never here.

mod classify;
mod days;
mod hours;
mod snap;

use crate::holidays::HolidayCalendar;
use crate::schedule::Schedule;

/// A schedule plus one holiday snapshot: everything needed to reason about working time
#[derive(Debug, Clone, Copy)]
pub struct BusinessClock<'a> {
    schedule: &'a Schedule,
    holidays: &'a HolidayCalendar,
}

impl<'a> BusinessClock<'a> {
    pub fn new(schedule: &'a Schedule, holidays: &'a HolidayCalendar) -> Self {
        Self { schedule, holidays }
    }

    pub fn schedule(&self) -> &Schedule {
        self.schedule
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, NaiveDateTime};

    /// Local wall-clock value from a `YYYY-MM-DD HH:MM[:SS]` literal
    pub fn local(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
            .unwrap_or_else(|e| panic!("bad test timestamp {:?}: {}", s, e))
    }

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }
}
