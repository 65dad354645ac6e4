//! Time utility functions
//!
//! Parsing for the date/time-like declared column types. Every parser walks a
//! fixed, ordered list of accepted shapes and returns `None` only when none of
//! them match.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::codec::Zone;

/// Naive (offset-less) datetime layouts, tried in order after RFC 3339.
/// Naive values are taken to be UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S%.f",
];

/// Offset-carrying layouts that RFC 3339 does not cover
const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Date-only layouts, midnight UTC
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a datetime string against the accepted layouts.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
        }
    }
    None
}

/// Render a datetime the way it is written back to text columns.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)
}

/// Parse a duration string.
///
/// Accepted, in order:
/// - `H:MM:SS[.ffffff]`
/// - `D day[s], H:MM:SS[.ffffff]` (D may be negative)
/// - plain seconds, integral or fractional (`3600`, `12.5`)
pub fn parse_duration(raw: &str) -> Option<TimeDelta> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some((days_part, clock)) = s.split_once(',') {
        let days_str = days_part
            .trim()
            .strip_suffix("days")
            .or_else(|| days_part.trim().strip_suffix("day"))?;
        let days: i64 = days_str.trim().parse().ok()?;
        let clock = parse_clock(clock.trim())?;
        return TimeDelta::try_days(days)?.checked_add(&clock);
    }

    if s.contains(':') {
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let clock = parse_clock(body)?;
        return Some(if negative { -clock } else { clock });
    }

    let seconds: f64 = s.parse().ok()?;
    if !seconds.is_finite() {
        return None;
    }
    let micros = (seconds * 1_000_000.0).round();
    if micros.abs() > i64::MAX as f64 {
        return None;
    }
    Some(TimeDelta::microseconds(micros as i64))
}

/// `H:MM:SS[.f]` with unbounded hours
fn parse_clock(s: &str) -> Option<TimeDelta> {
    let mut parts = s.splitn(3, ':');
    let hours: i64 = parts.next()?.trim().parse().ok()?;
    let minutes: i64 = parts.next()?.trim().parse().ok()?;
    let seconds_part = parts.next()?.trim();
    if !(0..60).contains(&minutes) || hours < 0 {
        return None;
    }

    let (whole, frac) = match seconds_part.split_once('.') {
        Some((w, f)) => (w, f),
        None => (seconds_part, ""),
    };
    let seconds: i64 = whole.parse().ok()?;
    if !(0..60).contains(&seconds) {
        return None;
    }
    let micros = if frac.is_empty() {
        0
    } else {
        if frac.len() > 6 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        format!("{:0<6}", frac).parse::<i64>().ok()?
    };

    let total = TimeDelta::try_hours(hours)?
        .checked_add(&TimeDelta::try_minutes(minutes)?)?
        .checked_add(&TimeDelta::try_seconds(seconds)?)?;
    total.checked_add(&TimeDelta::microseconds(micros))
}

/// Render a duration as `[D day[s], ]H:MM:SS[.ffffff]`.
///
/// Days are floored, so only the day count carries a sign and the clock part
/// is always positive: `-25h` is `-2 days, 23:00:00`. `parse_duration` reads
/// this form back exactly.
pub fn format_duration(delta: &TimeDelta) -> String {
    const DAY_MICROS: i64 = 86_400 * 1_000_000;

    let total_micros = delta.num_microseconds().unwrap_or(i64::MAX);
    let days = total_micros.div_euclid(DAY_MICROS);
    let rem = total_micros.rem_euclid(DAY_MICROS);

    let micros = rem % 1_000_000;
    let secs = rem / 1_000_000;
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);

    let mut out = String::new();
    if days != 0 {
        let unit = if days.abs() == 1 { "day" } else { "days" };
        out.push_str(&format!("{} {}, ", days, unit));
    }
    out.push_str(&format!("{}:{:02}:{:02}", h, m, s));
    if micros > 0 {
        out.push_str(&format!(".{:06}", micros));
    }
    out
}

/// Parse a timezone string.
///
/// Accepted, in order: `Z`, a bare offset (`+05:00`, `-0700`, `+5`), a
/// `UTC`/`GMT` prefixed offset (`UTC-07:00`), an IANA zone name.
pub fn parse_timezone(raw: &str) -> Option<Zone> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if s == "Z" {
        return FixedOffset::east_opt(0).map(Zone::Fixed);
    }
    if let Some(offset) = parse_offset(s) {
        return Some(Zone::Fixed(offset));
    }
    for prefix in ["UTC", "GMT"] {
        if let Some(rest) = s.strip_prefix(prefix)
            && !rest.is_empty()
            && let Some(offset) = parse_offset(rest)
        {
            return Some(Zone::Fixed(offset));
        }
    }
    s.parse::<Tz>().ok().map(Zone::Named)
}

/// `(+|-)H[H][[:]MM[[:]SS]]`
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, body) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = body.chars().filter(|c| *c != ':').collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes, seconds) = match digits.len() {
        1 | 2 => (digits.parse::<i32>().ok()?, 0, 0),
        4 => (digits[..2].parse().ok()?, digits[2..].parse().ok()?, 0),
        6 => (
            digits[..2].parse().ok()?,
            digits[2..4].parse().ok()?,
            digits[4..].parse().ok()?,
        ),
        _ => return None,
    };
    if minutes >= 60 || seconds >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60 + seconds))
}
