//! Canonical, locale-independent text forms for scalars that travel as CBOR text.
//!
//! Every formatter here is a pure function of its input (the host local zone is
//! consulted only when an unzoned date-time has to be pinned to an offset), so
//! two encodings of the same value are byte-identical on any machine.

use chrono::{DateTime, FixedOffset, Local, LocalResult, NaiveDateTime, TimeDelta, TimeZone};

/// `chrono` format string for zoned date-times: `2024-01-02T03:04:05.123456+09:00`.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%:z";

/// Format string accepted for date-times that carry no offset.
const NAIVE_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const SECONDS_PER_DAY: i64 = 86_400;

/// Look-back used to find the offset in effect before a skipped local time.
const SKIPPED_DAYS: i64 = 2;
const NANOS_PER_TICK: u32 = 100;
const NANO_DIGITS: usize = 9;

pub fn format_date_time(value: &DateTime<FixedOffset>) -> String {
    value.format(DATE_TIME_FORMAT).to_string()
}

/// Pin an unzoned date-time to the host's local offset.
///
/// Ambiguous local times (DST fall-back) resolve to the earliest instant. A
/// local time skipped by a DST transition keeps its wall-clock reading and
/// takes the offset in effect just before the transition.
pub fn resolve_local(naive: &NaiveDateTime) -> DateTime<FixedOffset> {
    match Local.from_local_datetime(naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.fixed_offset(),
        LocalResult::None => match naive.checked_sub_signed(TimeDelta::days(SKIPPED_DAYS)) {
            Some(earlier) => {
                let offset = Local.offset_from_utc_datetime(&earlier);
                DateTime::from_naive_utc_and_offset(*naive - offset, offset)
            }
            None => naive.and_utc().fixed_offset(),
        },
    }
}

/// Express a zoned date-time as wall-clock time in the host's local zone.
pub fn to_local_naive(value: &DateTime<FixedOffset>) -> NaiveDateTime {
    value.with_timezone(&Local).naive_local()
}

/// Parse RFC 3339 text. Text without an offset is taken as host local time.
pub fn parse_date_time(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    match DateTime::parse_from_rfc3339(text) {
        Ok(value) => Some(value),
        Err(_) => NaiveDateTime::parse_from_str(text, NAIVE_DATE_TIME_FORMAT)
            .ok()
            .map(|naive| resolve_local(&naive)),
    }
}

/// Parse date-time text into host local wall-clock time.
pub fn parse_naive_date_time(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    match DateTime::parse_from_rfc3339(text) {
        Ok(value) => Some(to_local_naive(&value)),
        Err(_) => NaiveDateTime::parse_from_str(text, NAIVE_DATE_TIME_FORMAT).ok(),
    }
}

/// Format a duration as `[-][d.]hh:mm:ss[.fffffff[ff]]`.
///
/// The day prefix appears only when non-zero, the fraction only when non-zero.
/// Whole 100 ns ticks use seven fraction digits; anything finer uses nine.
pub fn format_duration(value: &TimeDelta) -> String {
    let negative = *value < TimeDelta::zero();
    let magnitude = if negative { -*value } else { *value };
    let secs = magnitude.num_seconds();
    let nanos = magnitude.subsec_nanos().unsigned_abs();

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    let days = secs / SECONDS_PER_DAY;
    if days > 0 {
        out.push_str(&format!("{}.", days));
    }
    let in_day = secs % SECONDS_PER_DAY;
    out.push_str(&format!(
        "{:02}:{:02}:{:02}",
        in_day / 3600,
        (in_day % 3600) / 60,
        in_day % 60
    ));
    if nanos % NANOS_PER_TICK == 0 {
        if nanos > 0 {
            out.push_str(&format!(".{:07}", nanos / NANOS_PER_TICK));
        }
    } else {
        out.push_str(&format!(".{:09}", nanos));
    }
    out
}

/// Parse the text produced by [`format_duration`].
pub fn parse_duration(text: &str) -> Option<TimeDelta> {
    let text = text.trim();
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    // A '.' after the last ':' starts the fraction; one before it ends the days.
    let last_colon = body.rfind(':')?;
    let (head, fraction) = match body[last_colon..].find('.') {
        Some(dot) => (
            &body[..last_colon + dot],
            Some(&body[last_colon + dot + 1..]),
        ),
        None => (body, None),
    };
    let (days, clock) = match head.split_once('.') {
        Some((days, clock)) => (digits(days)?, clock),
        None => (0, head),
    };

    let mut parts = clock.split(':');
    let hours = digits(parts.next()?)?;
    let minutes = digits(parts.next()?)?;
    let seconds = digits(parts.next()?)?;
    if parts.next().is_some() || hours >= 24 || minutes >= 60 || seconds >= 60 {
        return None;
    }

    let nanos = match fraction {
        Some(f) if f.len() <= NANO_DIGITS => {
            digits(f)? * 10_i64.pow((NANO_DIGITS - f.len()) as u32)
        }
        Some(_) => return None,
        None => 0,
    };

    let total = days
        .checked_mul(SECONDS_PER_DAY)?
        .checked_add(hours * 3600 + minutes * 60 + seconds)?;
    let delta = TimeDelta::try_seconds(total)?.checked_add(&TimeDelta::nanoseconds(nanos))?;
    Some(if negative { -delta } else { delta })
}

/// Round plain decimal text (`-123.456`) to an integer, ties to even.
///
/// Returns `None` when the integral part does not fit in an `i128`.
pub fn round_half_even(plain: &str) -> Option<i128> {
    let (negative, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, plain),
    };
    let (integral, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let mut value: i128 = if integral.is_empty() {
        0
    } else {
        integral.parse().ok()?
    };

    let mut rest = fraction.bytes();
    let round_up = match rest.next() {
        Some(b'6'..=b'9') => true,
        Some(b'5') => rest.any(|b| b != b'0') || value % 2 == 1,
        _ => false,
    };
    if round_up {
        value = value.checked_add(1)?;
    }
    Some(if negative { -value } else { value })
}

fn digits(text: &str) -> Option<i64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
