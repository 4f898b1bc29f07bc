//! Session-scoped state threaded explicitly through every fetch.
//!
//! The resolved place, history time range, sampling interval and daily forecast
//! length live here. The CLI owns the only `Session` and is its single writer.

use crate::error::{AppError, Result};
use crate::models::Place;
use crate::normalize::Interval;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// Input format for history start/stop dates.
pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Number of days requested from the daily forecast endpoint unless configured.
pub const DEFAULT_DAILY_COUNT: u8 = 16;

/// Inclusive UTC time range for the air pollution history endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(AppError::InvalidInput(format!(
                "start {} is after end {}",
                start.format(DATE_INPUT_FORMAT),
                end.format(DATE_INPUT_FORMAT)
            )));
        }
        Ok(Self { start, end })
    }

    /// The week ending at `now`.
    pub fn last_week(now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::days(7),
            end: now,
        }
    }
}

/// Parses an operator-entered date as UTC.
///
/// Blank input means "use the default" and yields `Ok(None)`.
///
/// # Errors
///
/// Returns `AppError::InvalidInput` if the text is not `YYYY-MM-DD HH:MM:SS`.
pub fn parse_date_input(input: &str) -> Result<Option<DateTime<Utc>>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(input, DATE_INPUT_FORMAT)
        .map(|naive| Some(naive.and_utc()))
        .map_err(|_| {
            AppError::InvalidInput(format!(
                "'{}' is not a date in YYYY-MM-DD HH:MM:SS format",
                input
            ))
        })
}

#[derive(Debug, Clone)]
pub struct Session {
    pub place: Option<Place>,
    pub range: TimeRange,
    pub interval: Interval,
    pub daily_count: u8,
}

impl Session {
    pub fn new(daily_count: u8) -> Self {
        Self {
            place: None,
            range: TimeRange::last_week(Utc::now()),
            interval: Interval::default(),
            daily_count,
        }
    }

    /// Replaces the session place; every later fetch uses it.
    pub fn set_place(&mut self, place: Place) {
        self.place = Some(place);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_DAILY_COUNT)
    }
}
