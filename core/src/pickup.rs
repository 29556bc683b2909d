//! Pickup instant construction.
//!
//! The booking form sends a calendar date (`YYYY-MM-DD`) and a 24-hour clock
//! time (`H:mm` / `HH:mm`). Together they name a wall-clock moment in the
//! server's local time zone, which is converted to UTC for storage.

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

#[allow(clippy::unwrap_used)] // literal pattern
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").unwrap());

#[allow(clippy::unwrap_used)] // literal pattern
static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{1,2}):([0-9]{2})$").unwrap());

/// Why a date/time pair could not be turned into an instant.
///
/// A malformed string and an out-of-range value are separate variants
/// because they produce different diagnostics for the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickupTimeError {
    /// Date or time was empty.
    #[error("Pickup date and time are required")]
    MissingComponent,

    /// Date does not look like `YYYY-MM-DD`.
    #[error("Invalid date format: {0}. Expected YYYY-MM-DD")]
    MalformedDate(String),

    /// Date has the right shape but does not exist (e.g. `2025-02-30`).
    #[error("Invalid calendar date: {0}")]
    InvalidCalendarDate(String),

    /// Time does not look like `H:mm` / `HH:mm`.
    #[error("Invalid time format: {0}. Expected HH:mm (24-hour format, e.g., 09:00, 14:30)")]
    MalformedTime(String),

    /// Hour outside 0..=23.
    #[error("Invalid hour: {0}. Hour must be between 0 and 23")]
    HourOutOfRange(u32),

    /// Minute outside 0..=59.
    #[error("Invalid minute: {0}. Minute must be between 0 and 59")]
    MinuteOutOfRange(u32),

    /// The wall-clock time is skipped by a daylight-saving transition.
    #[error("Pickup time {0} does not exist in the local time zone")]
    NonexistentLocalTime(String),
}

/// Parse a `YYYY-MM-DD` string into a calendar date.
///
/// # Errors
///
/// [`PickupTimeError::MalformedDate`] when the shape is wrong,
/// [`PickupTimeError::InvalidCalendarDate`] when the date does not exist.
pub fn parse_date(raw: &str) -> Result<NaiveDate, PickupTimeError> {
    let caps = DATE_PATTERN
        .captures(raw)
        .ok_or_else(|| PickupTimeError::MalformedDate(raw.to_string()))?;
    let year: i32 = caps[1]
        .parse()
        .map_err(|_| PickupTimeError::MalformedDate(raw.to_string()))?;
    let month: u32 = caps[2]
        .parse()
        .map_err(|_| PickupTimeError::MalformedDate(raw.to_string()))?;
    let day: u32 = caps[3]
        .parse()
        .map_err(|_| PickupTimeError::MalformedDate(raw.to_string()))?;
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| PickupTimeError::InvalidCalendarDate(raw.to_string()))
}

/// Parse an `H:mm` / `HH:mm` string into a time of day.
///
/// # Errors
///
/// [`PickupTimeError::MalformedTime`] when the shape is wrong,
/// [`PickupTimeError::HourOutOfRange`] / [`PickupTimeError::MinuteOutOfRange`]
/// when a component is outside its range.
pub fn parse_time(raw: &str) -> Result<NaiveTime, PickupTimeError> {
    let caps = TIME_PATTERN
        .captures(raw)
        .ok_or_else(|| PickupTimeError::MalformedTime(raw.to_string()))?;
    let hour: u32 = caps[1]
        .parse()
        .map_err(|_| PickupTimeError::MalformedTime(raw.to_string()))?;
    let minute: u32 = caps[2]
        .parse()
        .map_err(|_| PickupTimeError::MalformedTime(raw.to_string()))?;
    if hour > 23 {
        return Err(PickupTimeError::HourOutOfRange(hour));
    }
    if minute > 59 {
        return Err(PickupTimeError::MinuteOutOfRange(minute));
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| PickupTimeError::MalformedTime(raw.to_string()))
}

/// Combine a pickup date and time in the server's local time zone.
///
/// # Errors
///
/// See [`to_pickup_at_in`].
pub fn to_pickup_at(date: &str, time: &str) -> Result<DateTime<Utc>, PickupTimeError> {
    to_pickup_at_in(date, time, &Local)
}

/// Combine a pickup date and time in an explicit time zone.
///
/// An ambiguous wall-clock time (clocks falling back) resolves to the
/// earlier of the two instants.
///
/// # Errors
///
/// Returns a [`PickupTimeError`] when either component is missing, malformed
/// or out of range, or when the wall-clock time does not exist in `tz`.
pub fn to_pickup_at_in<Tz: TimeZone>(
    date: &str,
    time: &str,
    tz: &Tz,
) -> Result<DateTime<Utc>, PickupTimeError> {
    let date = date.trim();
    let time = time.trim();
    if date.is_empty() || time.is_empty() {
        return Err(PickupTimeError::MissingComponent);
    }

    let naive = parse_date(date)?.and_time(parse_time(time)?);

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(instant) | LocalResult::Ambiguous(instant, _) => {
            Ok(instant.with_timezone(&Utc))
        }
        LocalResult::None => Err(PickupTimeError::NonexistentLocalTime(format!("{date} {time}"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn toronto_winter() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    #[test]
    fn combines_date_and_time_in_the_given_zone() {
        let at = to_pickup_at_in("2025-03-10", "09:00", &toronto_winter()).unwrap();
        assert_eq!(at.to_rfc3339(), "2025-03-10T14:00:00+00:00");
    }

    #[test]
    fn accepts_single_digit_hour() {
        let at = to_pickup_at_in("2025-03-10", "9:05", &Utc).unwrap();
        assert_eq!(at.to_rfc3339(), "2025-03-10T09:05:00+00:00");
    }

    #[test]
    fn uses_server_local_zone_by_default() {
        let at = to_pickup_at("2025-03-10", "09:00").unwrap();
        let expected = Local
            .with_ymd_and_hms(2025, 3, 10, 9, 0, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(at, expected);
    }

    #[test]
    fn out_of_range_hour_is_distinct_from_malformed() {
        assert_eq!(
            to_pickup_at_in("2025-03-10", "25:00", &Utc),
            Err(PickupTimeError::HourOutOfRange(25))
        );
        assert_eq!(
            to_pickup_at_in("2025-03-10", "12:60", &Utc),
            Err(PickupTimeError::MinuteOutOfRange(60))
        );
        assert_eq!(
            to_pickup_at_in("2025-03-10", "noon", &Utc),
            Err(PickupTimeError::MalformedTime("noon".to_string()))
        );
        assert_eq!(
            to_pickup_at_in("2025-03-10", "123:00", &Utc),
            Err(PickupTimeError::MalformedTime("123:00".to_string()))
        );
    }

    #[test]
    fn rejects_malformed_and_impossible_dates() {
        assert_eq!(
            to_pickup_at_in("10/03/2025", "09:00", &Utc),
            Err(PickupTimeError::MalformedDate("10/03/2025".to_string()))
        );
        assert_eq!(
            to_pickup_at_in("2025-02-30", "09:00", &Utc),
            Err(PickupTimeError::InvalidCalendarDate("2025-02-30".to_string()))
        );
    }

    #[test]
    fn rejects_non_ascii_digits() {
        // `\d` would match these; the pattern is ASCII only.
        assert!(matches!(
            to_pickup_at_in("２０２５-03-10", "09:00", &Utc),
            Err(PickupTimeError::MalformedDate(_))
        ));
    }

    #[test]
    fn missing_components() {
        assert_eq!(
            to_pickup_at_in("", "09:00", &Utc),
            Err(PickupTimeError::MissingComponent)
        );
        assert_eq!(
            to_pickup_at_in("2025-03-10", "  ", &Utc),
            Err(PickupTimeError::MissingComponent)
        );
    }

    #[test]
    fn error_messages_name_the_offending_value() {
        assert_eq!(
            PickupTimeError::HourOutOfRange(25).to_string(),
            "Invalid hour: 25. Hour must be between 0 and 23"
        );
    }
}
