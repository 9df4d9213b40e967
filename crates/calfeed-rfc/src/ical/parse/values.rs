//! Value parsers for the handful of RFC 5545 value types events need.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use super::error::{ParseError, ParseErrorKind, ParseResult};

/// A DATE or DATE-TIME value before any zone has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    /// `YYYYMMDD`
    Date(NaiveDate),
    /// `YYYYMMDDTHHMMSSZ`
    Utc(NaiveDateTime),
    /// `YYYYMMDDTHHMMSS`, floating or qualified by a `TZID` parameter.
    Local(NaiveDateTime),
}

/// Parses a DATE value (RFC 5545 §3.3.4).
///
/// ## Errors
/// Returns an error if the string is not a valid `YYYYMMDD` calendar date.
pub fn parse_date(s: &str, line: usize, col: usize) -> ParseResult<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::new(ParseErrorKind::InvalidDate, line, col).with_context(s));
    }

    let year = s[0..4].parse::<i32>();
    let month = s[4..6].parse::<u32>();
    let day = s[6..8].parse::<u32>();

    match (year, month, day) {
        (Ok(year), Ok(month), Ok(day)) => NaiveDate::from_ymd_opt(year, month, day),
        _ => None,
    }
    .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidDate, line, col).with_context(s))
}

/// Parses a TIME value (RFC 5545 §3.3.12).
///
/// Format: HHMMSS[Z] (e.g., "133000", "133000Z")
///
/// ## Errors
/// Returns an error if the string is not a valid 6-digit time.
pub fn parse_time(s: &str, line: usize, col: usize) -> ParseResult<(NaiveTime, bool)> {
    let (time_str, is_utc) = if let Some(stripped) = s.strip_suffix('Z') {
        (stripped, true)
    } else {
        (s, false)
    };

    if time_str.len() != 6 || !time_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::new(ParseErrorKind::InvalidTime, line, col).with_context(s));
    }

    let hour = time_str[0..2].parse::<u32>();
    let minute = time_str[2..4].parse::<u32>();
    let second = time_str[4..6].parse::<u32>();

    let time = match (hour, minute, second) {
        // Leap second (60) is clamped to 59.
        (Ok(hour), Ok(minute), Ok(second)) => NaiveTime::from_hms_opt(hour, minute, second.min(59)),
        _ => None,
    }
    .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidTime, line, col).with_context(s))?;

    Ok((time, is_utc))
}

/// Parses a DATE or DATE-TIME value, deciding the form from its shape.
///
/// ## Errors
/// Returns an error if the value matches neither `YYYYMMDD` nor
/// `YYYYMMDDTHHMMSS[Z]`.
pub fn parse_date_value(s: &str, line: usize, col: usize) -> ParseResult<DateValue> {
    let s = s.trim();
    let Some(t_pos) = s.find('T') else {
        return parse_date(s, line, col).map(DateValue::Date);
    };

    let date = parse_date(&s[..t_pos], line, col)
        .map_err(|err| ParseError { kind: ParseErrorKind::InvalidDateTime, ..err })?;
    let (time, is_utc) = parse_time(&s[t_pos + 1..], line, col + t_pos + 1)
        .map_err(|err| ParseError { kind: ParseErrorKind::InvalidDateTime, ..err })?;

    let naive = NaiveDateTime::new(date, time);
    Ok(if is_utc {
        DateValue::Utc(naive)
    } else {
        DateValue::Local(naive)
    })
}

/// Parses a DURATION value (RFC 5545 §3.3.6).
///
/// Format: `[+/-]P[nW]` or `[+/-]P[nD][T[nH][nM][nS]]`
///
/// ## Errors
/// Returns an error if the string is not a valid duration.
pub fn parse_duration(s: &str, line: usize, col: usize) -> ParseResult<TimeDelta> {
    let invalid = || ParseError::new(ParseErrorKind::InvalidDuration, line, col).with_context(s);

    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let rest = rest.strip_prefix('P').ok_or_else(invalid)?;
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total = TimeDelta::zero();
    let mut in_time = false;
    let mut number = String::new();
    let mut saw_component = false;

    for c in rest.chars() {
        match c {
            '0'..='9' => number.push(c),
            'T' if !in_time && number.is_empty() => in_time = true,
            'W' | 'D' | 'H' | 'M' | 'S' => {
                let amount: i64 = number.parse().map_err(|_err| invalid())?;
                number.clear();
                saw_component = true;
                let component = match (c, in_time) {
                    ('W', false) => TimeDelta::try_weeks(amount),
                    ('D', false) => TimeDelta::try_days(amount),
                    ('H', true) => TimeDelta::try_hours(amount),
                    ('M', true) => TimeDelta::try_minutes(amount),
                    ('S', true) => TimeDelta::try_seconds(amount),
                    _ => return Err(invalid()),
                };
                total = component
                    .and_then(|component| total.checked_add(&component))
                    .ok_or_else(invalid)?;
            }
            _ => return Err(invalid()),
        }
    }

    if !number.is_empty() || !saw_component {
        return Err(invalid());
    }

    Ok(if negative { -total } else { total })
}

/// Unescapes a TEXT value (RFC 5545 §3.3.11).
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n' | 'N') => result.push('\n'),
                Some(',') => result.push(','),
                Some(';') => result.push(';'),
                Some('\\') | None => result.push('\\'),
                Some(other) => {
                    // Invalid escape, preserve as-is
                    result.push('\\');
                    result.push(other);
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}
