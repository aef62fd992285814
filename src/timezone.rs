/// Conversion between UTC wire timestamps and business-local wall-clock time

use chrono::{DateTime, LocalResult, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::CalcError;

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Bogota;

/// Zone-less layouts read as UTC
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse an ISO-8601 timestamp into a UTC instant.
/// Explicit offsets are honoured; a missing offset means UTC.
pub fn parse_utc(text: &str) -> Result<DateTime<Utc>, CalcError> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| CalcError::InvalidTimestamp(text.to_string()))
}

/// Format a UTC instant as `YYYY-MM-DDTHH:MM:SS.mmmZ`
pub fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The single business timezone, at the boundary between UTC and local time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gateway {
    tz: Tz,
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE)
    }
}

impl Gateway {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Parse a UTC wire timestamp into business-local wall-clock time
    pub fn to_business_local(&self, utc_text: &str) -> Result<NaiveDateTime, CalcError> {
        parse_utc(utc_text).map(|dt| self.local_from_utc(&dt))
    }

    pub fn local_from_utc(&self, dt: &DateTime<Utc>) -> NaiveDateTime {
        dt.with_timezone(&self.tz).naive_local()
    }

    /// Business-local wall-clock time back to a UTC wire timestamp.
    /// Ambiguous local times take the earlier instant; skipped ones are an error.
    pub fn to_utc(&self, local: NaiveDateTime) -> Result<String, CalcError> {
        match self.tz.from_local_datetime(&local) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                Ok(format_utc(&dt.with_timezone(&Utc)))
            }
            LocalResult::None => Err(CalcError::SerializationError(format!(
                "{} does not exist in {}",
                local, self.tz
            ))),
        }
    }

    /// Current business-local time
    pub fn now(&self) -> NaiveDateTime {
        self.local_from_utc(&Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_utc_zulu_with_millis() {
        let dt = parse_utc("2025-04-10T15:00:00.000Z").unwrap();
        assert_eq!(format_utc(&dt), "2025-04-10T15:00:00.000Z");
    }

    #[test]
    fn test_parse_utc_offset_normalized() {
        let dt = parse_utc("2025-04-10T10:00:00-05:00").unwrap();
        assert_eq!(format_utc(&dt), "2025-04-10T15:00:00.000Z");
    }

    #[test]
    fn test_parse_utc_without_zone_is_utc() {
        let dt = parse_utc("2025-04-10T15:00:00").unwrap();
        assert_eq!(format_utc(&dt), "2025-04-10T15:00:00.000Z");
        let dt = parse_utc("2025-04-10T15:00").unwrap();
        assert_eq!(format_utc(&dt), "2025-04-10T15:00:00.000Z");
    }

    #[test]
    fn test_parse_utc_rejects_invalid() {
        for bad in ["", "hello", "2025-13-01T00:00:00Z", "2025-02-30T00:00:00Z", "2025-04-10T25:00:00Z"] {
            assert_eq!(
                parse_utc(bad),
                Err(CalcError::InvalidTimestamp(bad.to_string())),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_bogota_is_utc_minus_five() {
        let gw = Gateway::default();
        let local = gw.to_business_local("2025-04-12T20:00:00Z").unwrap();
        assert_eq!(local.to_string(), "2025-04-12 15:00:00");
        assert_eq!(gw.to_utc(local).unwrap(), "2025-04-12T20:00:00.000Z");
    }

    #[test]
    fn test_to_utc_keeps_millis() {
        let gw = Gateway::default();
        let local = gw.to_business_local("2025-04-14T14:00:00.123Z").unwrap();
        assert_eq!(gw.to_utc(local).unwrap(), "2025-04-14T14:00:00.123Z");
    }

    #[test]
    fn test_to_utc_rejects_dst_gap() {
        // 2025-03-09 02:30 does not exist in New York
        let gw = Gateway::new(chrono_tz::America::New_York);
        let local = NaiveDateTime::parse_from_str("2025-03-09 02:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert!(matches!(gw.to_utc(local), Err(CalcError::SerializationError(_))));
    }

    #[test]
    fn test_now_is_close_to_utc_now() {
        let gw = Gateway::default();
        let utc_again = gw.to_utc(gw.now()).unwrap();
        let parsed = parse_utc(&utc_again).unwrap();
        assert!((Utc::now() - parsed).num_seconds().abs() < 5);
    }
}
