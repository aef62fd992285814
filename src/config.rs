use anyhow::{bail, Context, Result};
use chrono_tz::Tz;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::holidays::HolidaySource;
use crate::schedule::{
    Schedule, DEFAULT_END_HOUR, DEFAULT_LUNCH_END_HOUR, DEFAULT_LUNCH_START_HOUR, DEFAULT_START_HOUR,
};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOLIDAYS_URL: &str = "https://content.capta.co/Recruitment/WorkingDays.json";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Shortest allowed refresh interval
pub const MIN_REFRESH_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    // HTTP listener
    pub port: u16,

    // Business timezone (IANA name)
    pub timezone: Tz,

    // Holiday list: file wins over URL when both are set
    pub holidays_url: String,
    pub holidays_file: Option<PathBuf>,
    pub holiday_fetch_timeout_secs: u64,

    // Periodic reload (optional, disabled if not set)
    pub holiday_refresh_secs: Option<u64>,

    // Daily schedule hours, checked by validate()
    pub start_hour: u32,
    pub lunch_start_hour: u32,
    pub lunch_end_hour: u32,
    pub end_hour: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env if present, ignore if missing
        Self::from_getter(|key| env::var(key).ok())
    }

    /// Parse config from a custom getter function (for testing)
    pub fn from_getter<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let hour = |key: &str, default: u32| -> Result<u32> {
            match get(key).filter(|s| !s.trim().is_empty()) {
                Some(v) => v
                    .trim()
                    .parse()
                    .with_context(|| format!("{} must be an hour between 0 and 23", key)),
                None => Ok(default),
            }
        };

        Ok(Config {
            port: get("PORT")
                .unwrap_or_else(|| DEFAULT_PORT.to_string())
                .trim()
                .parse()
                .context("PORT must be a valid port number")?,

            timezone: match get("BUSINESS_TIMEZONE").filter(|s| !s.is_empty()) {
                Some(name) => name
                    .trim()
                    .parse()
                    .map_err(|e| anyhow::anyhow!("BUSINESS_TIMEZONE '{}' is not an IANA zone: {}", name, e))?,
                None => crate::timezone::DEFAULT_TIMEZONE,
            },

            holidays_url: get("HOLIDAYS_URL")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_HOLIDAYS_URL.to_string()),
            holidays_file: get("HOLIDAYS_FILE").filter(|s| !s.is_empty()).map(PathBuf::from),
            holiday_fetch_timeout_secs: get("HOLIDAY_FETCH_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),

            holiday_refresh_secs: get("HOLIDAY_REFRESH_SECS").and_then(|s| s.parse().ok()),

            start_hour: hour("WORK_START_HOUR", DEFAULT_START_HOUR)?,
            lunch_start_hour: hour("LUNCH_START_HOUR", DEFAULT_LUNCH_START_HOUR)?,
            lunch_end_hour: hour("LUNCH_END_HOUR", DEFAULT_LUNCH_END_HOUR)?,
            end_hour: hour("WORK_END_HOUR", DEFAULT_END_HOUR)?,
        })
    }

    /// Create config from a HashMap (convenience for testing)
    #[cfg(test)]
    pub fn from_map(map: &std::collections::HashMap<&str, &str>) -> Result<Self> {
        Self::from_getter(|key| map.get(key).map(|v| v.to_string()))
    }

    /// Validate configuration values at startup.
    /// Returns Ok(()) if all validations pass, or Err with details of what failed.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if let Err(e) = self.schedule() {
            errors.push(format!("{:#}", e));
        }

        if self.holidays_file.is_none()
            && !(self.holidays_url.starts_with("http://") || self.holidays_url.starts_with("https://"))
        {
            errors.push(format!(
                "HOLIDAYS_URL '{}' must be an http(s) URL.",
                self.holidays_url
            ));
        }

        if let Some(path) = &self.holidays_file {
            if !path.exists() {
                errors.push(format!("HOLIDAYS_FILE '{}' not found.", path.display()));
            }
        }

        if self.holiday_fetch_timeout_secs == 0 {
            errors.push("HOLIDAY_FETCH_TIMEOUT_SECS must be greater than 0.".to_string());
        }

        if let Some(secs) = self.holiday_refresh_secs {
            if secs < MIN_REFRESH_SECS {
                errors.push(format!(
                    "HOLIDAY_REFRESH_SECS={} is too short (min: {}).",
                    secs, MIN_REFRESH_SECS
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )
        }
    }

    pub fn schedule(&self) -> Result<Schedule> {
        Schedule::new(
            self.start_hour,
            self.lunch_start_hour,
            self.lunch_end_hour,
            self.end_hour,
        )
        .context("Invalid working schedule")
    }

    pub fn holiday_source(&self) -> HolidaySource {
        match &self.holidays_file {
            Some(path) => HolidaySource::File(path.clone()),
            None => HolidaySource::Url(self.holidays_url.clone()),
        }
    }

    pub fn holiday_fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.holiday_fetch_timeout_secs)
    }

    pub fn holiday_refresh_interval(&self) -> Option<Duration> {
        self.holiday_refresh_secs.map(Duration::from_secs)
    }
}
