//! Delay arithmetic.
//!
//! Feeds report the real (expected) departure time plus a delay in seconds.
//! The board shows the planned time, the delay in minutes, and how many
//! minutes remain until departure.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone};

use super::time::ParsedTime;

/// Clock time with a delay removed.
///
/// Borrowing runs seconds → minutes → hours; the hour wraps modulo 24
/// without any date adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlannedTime {
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
}

/// Derive the planned time from the real time and a delay in seconds.
///
/// # Examples
///
/// ```
/// use departure_board::departures::{PlannedTime, plan_from_delay};
///
/// assert_eq!(plan_from_delay(17, 5, 0, 600), PlannedTime { hour: 16, minute: 55, second: 0 });
/// // Crossing midnight wraps the hour; the date is not tracked.
/// assert_eq!(plan_from_delay(0, 15, 0, 1800), PlannedTime { hour: 23, minute: 45, second: 0 });
/// ```
pub fn plan_from_delay(hour: i32, minute: i32, second: i32, delay_seconds: i32) -> PlannedTime {
    let mut second = i64::from(second) - i64::from(delay_seconds);
    let mut minute = i64::from(minute);
    let mut hour = i64::from(hour);

    // Borrow in bulk; same result as borrowing one unit at a time.
    if second < 0 {
        let borrow = (-second + 59) / 60;
        second += borrow * 60;
        minute -= borrow;
    }
    if minute < 0 {
        let borrow = (-minute + 59) / 60;
        minute += borrow * 60;
        hour -= borrow;
    }
    if hour < 0 {
        hour = hour.rem_euclid(24);
    }

    PlannedTime {
        hour: saturate(hour),
        minute: saturate(minute),
        second: saturate(second),
    }
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Convert a delay in seconds to whole minutes, truncating toward zero.
///
/// `179` becomes `2`, `-120` becomes `-2`, `-90` becomes `-1`.
pub fn seconds_to_minutes_delay(delay_seconds: i32) -> i32 {
    delay_seconds / 60
}

/// Minutes from `now` until the departure, read as local time.
///
/// Returns `-1` for an invalid time. The difference is truncated toward
/// zero, so a departure 90 seconds in the past gives `-1`, not `-2`.
pub fn minutes_until<Tz: TimeZone>(parsed: &ParsedTime, now: &DateTime<Tz>) -> i64 {
    minutes_until_in(parsed, &Local, now)
}

/// Minutes from `now` until the departure, reading its fields in `zone`.
pub fn minutes_until_in<Z: TimeZone, Tz: TimeZone>(
    parsed: &ParsedTime,
    zone: &Z,
    now: &DateTime<Tz>,
) -> i64 {
    if !parsed.valid {
        return -1;
    }
    let Some(departure) = to_instant(parsed, zone) else {
        return -1;
    };

    (departure.timestamp() - now.timestamp()) / 60
}

/// Resolve calendar fields to an instant in `zone`.
///
/// Out-of-range fields roll over into the next unit (month 13 is January of
/// the following year, hour 24 is midnight of the next day). A local time
/// skipped by a DST change moves forward an hour; a repeated one resolves to
/// the earlier instant.
fn to_instant<Z: TimeZone>(parsed: &ParsedTime, zone: &Z) -> Option<DateTime<Z>> {
    let naive = normalise(parsed)?;
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(instant) => Some(instant),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => naive
            .checked_add_signed(Duration::hours(1))
            .and_then(|shifted| zone.from_local_datetime(&shifted).earliest()),
    }
}

fn normalise(parsed: &ParsedTime) -> Option<NaiveDateTime> {
    let months = i64::from(parsed.year) * 12 + i64::from(parsed.month) - 1;
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month = u32::try_from(months.rem_euclid(12) + 1).ok()?;

    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;
    let offset = Duration::try_days(i64::from(parsed.day) - 1)?
        + Duration::try_hours(i64::from(parsed.hour))?
        + Duration::try_minutes(i64::from(parsed.minute))?
        + Duration::try_seconds(i64::from(parsed.second))?;

    first_of_month.checked_add_signed(offset)
}
