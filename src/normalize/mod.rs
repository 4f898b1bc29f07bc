//! Pure transformations from raw provider payloads to flat, table-ready records.
//!
//! Nothing in this module performs I/O or logs: every function maps its input to
//! an output (or a `MissingData` error) and can be exercised without a network.

mod air_quality;
mod forecast;
mod sampling;
mod weather;

pub use air_quality::*;
pub use forecast::*;
pub use sampling::*;
pub use weather::*;

use chrono::{TimeZone, Utc};

/// Formats a Unix timestamp (seconds) as UTC `YYYY-MM-DD HH:MM:SS`.
///
/// Timestamps chrono cannot represent are rendered as the raw number.
pub fn format_timestamp(ts: i64) -> String {
    match Utc.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ts.to_string(),
    }
}

/// Formats a Unix timestamp (seconds) as the UTC date `YYYY-MM-DD`.
pub fn format_date(ts: i64) -> String {
    match Utc.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => ts.to_string(),
    }
}
