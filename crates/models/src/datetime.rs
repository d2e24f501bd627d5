//! Date parsing for range lookups.
//!
//! Timestamps carrying an offset are converted to UTC; everything else is
//! compared as a naive wall-clock value.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::errors::ModelError;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParsedDate {
    pub at: NaiveDateTime,
    /// False for a bare `YYYY-MM-DD`.
    pub has_time: bool,
}

pub fn parse_datetime(input: &str) -> Option<ParsedDate> {
    let s = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(ParsedDate { at: dt.naive_utc(), has_time: true });
    }
    for fmt in DATE_TIME_FORMATS {
        if let Ok(at) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ParsedDate { at, has_time: true });
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|at| ParsedDate { at, has_time: false })
}

/// Inclusive `[start, end]` window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    /// Parse both bounds. With `end_of_day`, a date-only `end` becomes 23:59:59.999 of that day.
    pub fn parse(start: &str, end: &str, end_of_day: bool) -> Result<Self, ModelError> {
        let lower = parse_datetime(start).ok_or_else(|| ModelError::InvalidDate(start.to_string()))?;
        let upper = parse_datetime(end).ok_or_else(|| ModelError::InvalidDate(end.to_string()))?;
        let end = if end_of_day && !upper.has_time {
            upper.at.date().and_hms_milli_opt(23, 59, 59, 999).unwrap_or(upper.at)
        } else {
            upper.at
        };
        Ok(Self { start: lower.at, end })
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at <= self.end
    }

    /// Unparsable values never match.
    pub fn matches(&self, raw: &str) -> bool {
        parse_datetime(raw).is_some_and(|p| self.contains(p.at))
    }
}
