use chrono::{Days, NaiveDateTime};

use super::BusinessClock;

impl BusinessClock<'_> {
    /// Advance by `n` working days, keeping the time of day.
    /// `t` must already be snapped; the time is not re-validated here.
    /// `None` if the n-th working day lies past `NaiveDate::MAX`.
    pub fn add_working_days(&self, t: NaiveDateTime, n: u32) -> Option<NaiveDateTime> {
        let mut current = t;
        let mut added = 0;

        while added < n {
            current = current.checked_add_days(Days::new(1))?;
            if self.is_working_day(current.date()) {
                added += 1;
            }
        }

        Some(current)
    }
}
