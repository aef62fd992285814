/// Daily working schedule
/// Morning block [start, lunch_start), afternoon block [lunch_end, end), Monday to Friday

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::error::ScheduleError;

pub const DEFAULT_START_HOUR: u32 = 8; // 8 AM
pub const DEFAULT_LUNCH_START_HOUR: u32 = 12;
pub const DEFAULT_LUNCH_END_HOUR: u32 = 13;
pub const DEFAULT_END_HOUR: u32 = 17; // 5 PM

/// Fixed hours of the business day, all in the business timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    start: u32,
    lunch_start: u32,
    lunch_end: u32,
    end: u32,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_HOUR,
            lunch_start: DEFAULT_LUNCH_START_HOUR,
            lunch_end: DEFAULT_LUNCH_END_HOUR,
            end: DEFAULT_END_HOUR,
        }
    }
}

impl Schedule {
    pub fn new(start: u32, lunch_start: u32, lunch_end: u32, end: u32) -> Result<Self, ScheduleError> {
        if !(start < lunch_start && lunch_start < lunch_end && lunch_end < end) {
            return Err(ScheduleError::Ordering {
                start,
                lunch_start,
                lunch_end,
                end,
            });
        }
        if end > 23 {
            return Err(ScheduleError::EndPastMidnight(end));
        }
        Ok(Self {
            start,
            lunch_start,
            lunch_end,
            end,
        })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn lunch_start(&self) -> u32 {
        self.lunch_start
    }

    pub fn lunch_end(&self) -> u32 {
        self.lunch_end
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Saturday and Sunday are never worked
    pub fn is_weekend_day(weekday: Weekday) -> bool {
        matches!(weekday, Weekday::Sat | Weekday::Sun)
    }

    pub fn is_weekend(date: NaiveDate) -> bool {
        Self::is_weekend_day(date.weekday())
    }

    /// `date` at `hour:00:00.000`
    pub fn at(date: NaiveDate, hour: u32) -> NaiveDateTime {
        // Constructor guarantees every schedule hour is <= 23
        date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let s = Schedule::default();
        assert_eq!(s.start(), 8);
        assert_eq!(s.lunch_start(), 12);
        assert_eq!(s.lunch_end(), 13);
        assert_eq!(s.end(), 17);
    }

    #[test]
    fn test_new_accepts_ordered_hours() {
        let s = Schedule::new(7, 11, 13, 19).expect("valid schedule");
        assert_eq!((s.start(), s.lunch_start(), s.lunch_end(), s.end()), (7, 11, 13, 19));
        assert!(Schedule::new(0, 1, 2, 23).is_ok());
    }

    #[test]
    fn test_new_rejects_unordered_hours() {
        assert!(matches!(
            Schedule::new(8, 8, 13, 17),
            Err(ScheduleError::Ordering { .. })
        ));
        assert!(Schedule::new(8, 13, 12, 17).is_err());
        assert!(Schedule::new(8, 12, 17, 17).is_err());
        assert!(Schedule::new(17, 12, 13, 8).is_err());
    }

    #[test]
    fn test_new_rejects_end_at_midnight() {
        assert_eq!(
            Schedule::new(8, 12, 13, 24),
            Err(ScheduleError::EndPastMidnight(24))
        );
    }

    #[test]
    fn test_weekend_days() {
        assert!(Schedule::is_weekend_day(Weekday::Sat));
        assert!(Schedule::is_weekend_day(Weekday::Sun));
        for day in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri] {
            assert!(!Schedule::is_weekend_day(day), "{} is a weekday", day);
        }
        // 2025-04-12 is a Saturday
        assert!(Schedule::is_weekend(NaiveDate::from_ymd_opt(2025, 4, 12).unwrap()));
    }

    #[test]
    fn test_at_builds_top_of_hour() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 15).unwrap();
        let t = Schedule::at(date, 17);
        assert_eq!(t.to_string(), "2025-04-15 17:00:00");
    }
}
