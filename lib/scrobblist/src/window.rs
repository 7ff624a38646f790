use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{Result, SyncError};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive time range covered by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Parses two `YYYY-MM-DD` dates; the end date runs through 23:59:59 UTC.
    pub fn from_dates(start_date: &str, end_date: &str) -> Result<Self> {
        let start = parse_date(start_date)?;
        let end = parse_date(end_date)?;
        if start > end {
            return Err(SyncError::InvalidInput(
                "the start date must not be after the end date".to_string(),
            ));
        }

        let start = start
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| SyncError::InvalidDate(start_date.to_string()))?;
        let end = end
            .and_hms_opt(23, 59, 59)
            .ok_or_else(|| SyncError::InvalidDate(end_date.to_string()))?;
        Ok(Self {
            start: start.and_utc(),
            end: end.and_utc(),
        })
    }

    pub fn from_timestamp(&self) -> i64 {
        self.start.timestamp()
    }

    pub fn to_timestamp(&self) -> i64 {
        self.end.timestamp()
    }
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|e| SyncError::InvalidDate(format!("'{input}': {e}")))
}
