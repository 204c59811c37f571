//! Epoch-second timestamp codec.
//!
//! The service never sends calendar strings. Every timestamp on the wire is
//! the (possibly fractional, possibly negative) number of seconds since
//! 1970-01-01T00:00:00Z, usually as a numeric string.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

const MICROS_PER_SECOND: i64 = 1_000_000;

/// Encode a point in time as decimal epoch seconds.
///
/// Whole seconds render without a fraction; otherwise up to six fractional
/// digits are written with trailing zeros removed.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use notesync_core::timestamp::encode;
///
/// let time = Utc.timestamp_millis_opt(1_700_000_000_250).unwrap();
/// assert_eq!(encode(time), "1700000000.25");
/// ```
pub fn encode(time: DateTime<Utc>) -> String {
    let micros = time.timestamp_micros();
    let sign = if micros < 0 { "-" } else { "" };
    let magnitude = micros.unsigned_abs();
    let whole = magnitude / MICROS_PER_SECOND.unsigned_abs();
    let fraction = magnitude % MICROS_PER_SECOND.unsigned_abs();

    if fraction == 0 {
        return format!("{sign}{whole}");
    }

    let digits = format!("{fraction:06}");
    format!("{sign}{whole}.{}", digits.trim_end_matches('0'))
}

/// Decode a required epoch-second string.
pub fn decode(value: &str) -> Result<DateTime<Utc>> {
    decode_field("timestamp", value)
}

/// Decode an optional epoch-second string; absent or blank means no value.
pub fn decode_optional(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => decode(value).map(Some),
    }
}

pub(crate) fn decode_field(field: &'static str, value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();
    let seconds = trimmed
        .parse::<f64>()
        .map_err(|_| Error::format(field, value))?;
    from_seconds(seconds).ok_or_else(|| Error::format(field, value))
}

/// Convert fractional epoch seconds into a UTC time, rounded to the microsecond.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn from_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let micros = (seconds * MICROS_PER_SECOND as f64).round();
    if micros < i64::MIN as f64 || micros > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_micros(micros as i64)
}
