//! Lenient parsers for the textual fields of a trade log.
//!
//! Timestamps follow ISO-8601 as the trading process writes it: `T` or a space
//! between date and time, optional fractional seconds, an optional numeric
//! offset or a trailing `Z`. A bare date is read as midnight.

use crate::error::CoreError;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

const OFFSET_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A timestamp as it appeared in the log, before any timezone normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedTimestamp {
    WithOffset(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl ParsedTimestamp {
    /// The calendar date exactly as written, in the timestamp's own offset.
    pub fn local_date(&self) -> NaiveDate {
        match self {
            ParsedTimestamp::WithOffset(dt) => dt.date_naive(),
            ParsedTimestamp::Naive(naive) => naive.date(),
        }
    }

    /// Normalizes to UTC. A naive timestamp is interpreted in `fallback`
    /// when one is given, otherwise it is taken to already be UTC.
    pub fn to_utc(&self, fallback: Option<FixedOffset>) -> DateTime<Utc> {
        match self {
            ParsedTimestamp::WithOffset(dt) => dt.with_timezone(&Utc),
            ParsedTimestamp::Naive(naive) => {
                let shift = fallback.map_or(0, |offset| offset.local_minus_utc());
                (*naive - Duration::seconds(i64::from(shift))).and_utc()
            }
        }
    }
}

/// Parses an ISO-8601 date-time. Fails with the raw value on anything it cannot read.
pub fn parse_timestamp(raw: &str) -> Result<ParsedTimestamp, CoreError> {
    let trimmed = raw.trim();
    let normalized = match trimmed.strip_suffix(['Z', 'z']) {
        Some(head) => format!("{head}+00:00"),
        None => trimmed.to_string(),
    };

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Ok(ParsedTimestamp::WithOffset(dt));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Ok(ParsedTimestamp::Naive(naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        return Ok(ParsedTimestamp::Naive(date.and_time(chrono::NaiveTime::MIN)));
    }

    Err(CoreError::InvalidTimestamp(raw.to_string()))
}

/// Parses the `tz_offset` column: `Z`, `UTC`, `+02:00`, `-0530` or `+3`.
/// Returns `None` for blanks and anything unrecognised.
pub fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let upper = raw.trim().to_ascii_uppercase();
    let body = upper
        .strip_prefix("UTC")
        .or_else(|| upper.strip_prefix("GMT"))
        .unwrap_or(&upper);

    if body.is_empty() {
        // Blank input is "unknown", but a bare "UTC" is a real offset.
        return if upper.is_empty() { None } else { FixedOffset::east_opt(0) };
    }
    if body == "Z" {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match body.as_bytes()[0] {
        b'+' => (1, &body[1..]),
        b'-' => (-1, &body[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let (hours, minutes): (i32, i32) = match digits.len() {
        1 | 2 => (digits.parse().ok()?, 0),
        4 => (digits[..2].parse().ok()?, digits[2..].parse().ok()?),
        _ => return None,
    };
    if minutes >= 60 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Parses a numeric log field. Blank cells and unreadable values yield `None`.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}
