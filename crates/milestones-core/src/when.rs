//! Parsing of user-entered target times.
//!
//! Accepted forms:
//! - RFC 3339 (`2025-01-31T09:00:00+01:00`)
//! - local wall time (`2025-01-31 09:00` or `2025-01-31 09:00:30`)
//! - a local date alone (`2025-01-31`, midnight)
//! - relative to now (`+90s`, `+45m`, `+2h`, `+3d`)

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::ValidationError;
use crate::milestone::check_storable;

fn invalid(input: &str, message: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: "target".into(),
        message: format!("'{input}': {message}"),
    }
}

fn parse_relative(input: &str, offset: &str) -> Result<Duration, ValidationError> {
    let unit_at = offset.char_indices().last().map(|(i, _)| i).unwrap_or(0);
    let (digits, unit) = offset.split_at(unit_at);
    let amount: i64 = digits
        .parse()
        .map_err(|_| invalid(input, "expected +<number><s|m|h|d>"))?;
    let delta = match unit {
        "s" => Duration::try_seconds(amount),
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        _ => return Err(invalid(input, "unit must be one of s, m, h, d")),
    };
    delta.ok_or_else(|| invalid(input, "offset out of range"))
}

/// Parse `input` into a UTC instant, interpreting wall times in `tz`.
///
/// Instants outside the years the store can hold are rejected.
pub fn parse_target_in<Tz: TimeZone>(
    input: &str,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<DateTime<Utc>, ValidationError> {
    let target = parse_instant(input, now, tz)?;
    check_storable("target", &target)
        .map_err(|_| invalid(input.trim(), "year must be within 0000-9999"))?;
    Ok(target)
}

fn parse_instant<Tz: TimeZone>(
    input: &str,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<DateTime<Utc>, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(invalid(input, "empty"));
    }
    if let Some(offset) = input.strip_prefix('+') {
        let delta = parse_relative(input, offset)?;
        return now
            .checked_add_signed(delta)
            .ok_or_else(|| invalid(input, "offset out of range"));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| invalid(input, "unrecognised date/time"))?;

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        // Ambiguous during a DST fall-back: take the earlier instant.
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(invalid(input, "does not exist in the local timezone")),
    }
}

/// Parse `input` with wall times in the local timezone.
pub fn parse_target(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ValidationError> {
    parse_target_in(input, now, &Local)
}
