//! Converts calendar dates picked by the user into the timestamp range used
//! to filter stored transactions.

use serde::Deserialize;
use time::{Date, Duration};

use crate::{Error, transaction::core::format_timestamp};

/// A calendar date range, inclusive of both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    /// The first through the last day of the month containing `today`.
    pub fn current_month(today: Date) -> Self {
        let days_in_month = today.month().length(today.year());

        Self {
            start: today.replace_day(1).unwrap_or(today),
            end: today.replace_day(days_in_month).unwrap_or(today),
        }
    }

    /// The range chosen by the query parameters, falling back to the current
    /// month if either date is missing.
    pub fn from_query(query: &RangeQuery, today: Date) -> Self {
        match (query.start, query.end) {
            (Some(start), Some(end)) => Self { start, end },
            _ => Self::current_month(today),
        }
    }

    /// Convert to the timestamp range used for querying the store.
    ///
    /// # Errors
    /// Returns [Error::InvalidDateFormat] if either bound cannot be formatted.
    pub fn to_timestamp_range(self) -> Result<TimestampRange, Error> {
        build_range(self.start, self.end)
    }
}

/// The query parameters for filtering by date, e.g. `?start=2024-03-01&end=2024-03-31`.
///
/// Empty strings are treated as missing when extracted with `axum_extra`'s `Query`.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<Date>,
    pub end: Option<Date>,
}

/// A pair of UTC timestamps in the stored text format.
///
/// A timestamp `t` is in the range when `lower <= t <= upper`. Both bounds
/// are inclusive and compared as strings, which orders the same as time
/// because the format is fixed-width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampRange {
    pub lower: String,
    pub upper: String,
}

impl TimestampRange {
    /// Whether `timestamp` would be matched by the store's range filter.
    #[cfg(test)]
    pub fn contains(&self, timestamp: &str) -> bool {
        timestamp >= self.lower.as_str() && timestamp <= self.upper.as_str()
    }
}

/// Build the timestamp range for the calendar dates `start` through `end`.
///
/// The lower bound is `start` at midnight UTC. The upper bound is midnight
/// UTC of the day after `end`, so that every timestamp on `end` is
/// included. An inverted range matches nothing.
///
/// # Errors
/// Returns [Error::InvalidDateFormat] if either bound cannot be formatted.
pub fn build_range(start: Date, end: Date) -> Result<TimestampRange, Error> {
    let day_after_end = end.saturating_add(Duration::days(1));

    Ok(TimestampRange {
        lower: format_timestamp(start.midnight().assume_utc())?,
        upper: format_timestamp(day_after_end.midnight().assume_utc())?,
    })
}
