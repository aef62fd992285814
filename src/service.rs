//! End-to-end calculation: snap, then days, then hours

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::engine::BusinessClock;
use crate::error::CalcError;
use crate::holidays::HolidayStore;
use crate::schedule::Schedule;
use crate::timezone::Gateway;

/// How far to move from the start instant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationRequest {
    pub days: u32,
    pub hours: u32,
    /// UTC ISO-8601 start; `None` means now
    pub start: Option<String>,
}

/// Result instant, always UTC
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculationResult {
    pub date: String,
}

pub struct Calculator {
    gateway: Gateway,
    schedule: Schedule,
    holidays: Arc<HolidayStore>,
}

impl Calculator {
    pub fn new(gateway: Gateway, schedule: Schedule, holidays: Arc<HolidayStore>) -> Self {
        Self {
            gateway,
            schedule,
            holidays,
        }
    }

    pub fn gateway(&self) -> Gateway {
        self.gateway
    }

    pub fn holidays(&self) -> &HolidayStore {
        &self.holidays
    }

    pub fn calculate(&self, request: &CalculationRequest) -> Result<CalculationResult, CalcError> {
        self.calculate_at(request, Utc::now())
    }

    /// Same as [`Calculator::calculate`] with an explicit "now" for requests without a start
    pub fn calculate_at(
        &self,
        request: &CalculationRequest,
        now: DateTime<Utc>,
    ) -> Result<CalculationResult, CalcError> {
        let start = match &request.start {
            Some(text) => self.gateway.to_business_local(text)?,
            None => self.gateway.local_from_utc(&now),
        };

        // One snapshot for the whole calculation
        let holidays = self.holidays.snapshot();
        let clock = BusinessClock::new(&self.schedule, &holidays);

        let out_of_range = || CalcError::OutOfRange(start.to_string());

        let adjusted = clock.snap(start).ok_or_else(out_of_range)?;
        debug!("Start {} snapped to {}", start, adjusted);

        let mut result = adjusted;
        if request.days > 0 {
            result = clock
                .add_working_days(result, request.days)
                .ok_or_else(out_of_range)?;
            debug!("After {} working days: {}", request.days, result);
        }
        if request.hours > 0 {
            result = clock
                .add_working_hours(result, request.hours)
                .ok_or_else(out_of_range)?;
            debug!("After {} working hours: {}", request.hours, result);
        }

        Ok(CalculationResult {
            date: self.gateway.to_utc(result)?,
        })
    }
}
