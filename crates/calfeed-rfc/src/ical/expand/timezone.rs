//! Timezone resolution and UTC conversion for iCalendar date-times.
//!
//! Uses a display-name table for Outlook labels and ICU4X for Windows
//! timezone ID to IANA mapping and timezone canonicalization.

use calfeed_core::types::FloatingTime;
use chrono::{DateTime, Local, LocalResult, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;
use std::collections::HashMap;
use std::str::FromStr;

use super::windows_zones::{lookup_display_name, strip_offset_prefix};
use crate::ical::parse::{DateValue, parse_date_value};

/// Error during timezone conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Unknown or invalid timezone identifier.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Non-existent local time that could not be shifted out of a gap.
    #[error("Non-existent time (DST gap): {0}")]
    NonExistentTime(String),

    /// Invalid datetime format.
    #[error("Invalid datetime: {0}")]
    InvalidDateTime(String),
}

/// The zone a recurrence is anchored in while generating occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorZone {
    Utc,
    /// Floating times read as the process's local wall clock.
    Local,
    Zone(Tz),
}

impl AnchorZone {
    /// Converts to the zone type the `rrule` crate expands in.
    #[must_use]
    pub fn to_rrule_tz(self) -> rrule::Tz {
        match self {
            Self::Utc => rrule::Tz::UTC,
            Self::Local => rrule::Tz::Local(Local),
            Self::Zone(tz) => rrule::Tz::Tz(tz),
        }
    }
}

/// Resolver for timezone identifiers.
///
/// Caches resolved zones by their raw `TZID` label and carries the policy
/// for floating (zone-less) times. One resolver is used per parsed feed.
#[derive(Debug, Default)]
pub struct TimeZoneResolver {
    /// Cache of resolved IANA timezones by raw TZID.
    cache: HashMap<String, Tz>,
    floating: FloatingTime,
}

impl TimeZoneResolver {
    /// Creates a new timezone resolver.
    #[must_use]
    pub fn new(floating: FloatingTime) -> Self {
        Self {
            cache: HashMap::new(),
            floating,
        }
    }

    #[must_use]
    pub fn floating(&self) -> FloatingTime {
        self.floating
    }

    /// ## Summary
    /// Resolves a timezone identifier to a `chrono_tz::Tz`.
    ///
    /// The label is normalized first, so Windows display names, Windows zone
    /// ids and IANA aliases all resolve.
    ///
    /// ## Errors
    ///
    /// Returns `ConversionError::UnknownTimezone` if the TZID cannot be resolved.
    ///
    /// ## Side Effects
    ///
    /// Caches successful resolutions to avoid repeated lookups.
    pub fn resolve(&mut self, tzid: &str) -> Result<Tz, ConversionError> {
        if let Some(tz) = self.cache.get(tzid) {
            return Ok(*tz);
        }

        let normalized = normalize_label(tzid);
        let tz = Tz::from_str(&normalized)
            .map_err(|_e| ConversionError::UnknownTimezone(tzid.to_string()))?;

        self.cache.insert(tzid.to_string(), tz);

        Ok(tz)
    }

    /// ## Summary
    /// Converts a raw DATE or DATE-TIME value to a UTC instant.
    ///
    /// A pure date becomes midnight UTC, a trailing `Z` is taken as UTC, a
    /// `TZID` is resolved and applied, and anything else is floating.
    ///
    /// ## Errors
    ///
    /// Returns an error if the value does not parse, the zone is unknown, or
    /// the wall-clock reading cannot be placed in the zone.
    pub fn convert(
        &mut self,
        value: &str,
        tzid: Option<&str>,
    ) -> Result<DateTime<Utc>, ConversionError> {
        let parsed = parse_date_value(value, 0, 0)
            .map_err(|_err| ConversionError::InvalidDateTime(value.to_string()))?;

        match parsed {
            DateValue::Date(date) => Ok(date.and_time(NaiveTime::MIN).and_utc()),
            DateValue::Utc(naive) => Ok(naive.and_utc()),
            DateValue::Local(naive) => match tzid.map(str::trim).filter(|t| !t.is_empty()) {
                Some(tzid) => {
                    let tz = self.resolve(tzid)?;
                    local_wall_clock_to_utc(&tz, naive).ok_or_else(|| {
                        ConversionError::NonExistentTime(format!("{naive} in timezone {tzid}"))
                    })
                }
                None => self.floating_to_utc(naive),
            },
        }
    }

    /// ## Summary
    /// Picks the zone a recurring series starting at `value` is expanded in.
    ///
    /// Zoned starts anchor in their zone, floating starts follow the
    /// floating-time policy, and dates and UTC values anchor in UTC.
    pub fn anchor_for(&mut self, value: &str, tzid: Option<&str>) -> AnchorZone {
        if !matches!(parse_date_value(value, 0, 0), Ok(DateValue::Local(_))) {
            return AnchorZone::Utc;
        }

        match tzid.map(str::trim).filter(|t| !t.is_empty()) {
            Some(tzid) => self.resolve(tzid).map_or(AnchorZone::Utc, AnchorZone::Zone),
            None => match self.floating {
                FloatingTime::Local => AnchorZone::Local,
                FloatingTime::Utc => AnchorZone::Utc,
            },
        }
    }

    fn floating_to_utc(&self, naive: NaiveDateTime) -> Result<DateTime<Utc>, ConversionError> {
        match self.floating {
            FloatingTime::Utc => Ok(naive.and_utc()),
            FloatingTime::Local => local_wall_clock_to_utc(&Local, naive).ok_or_else(|| {
                ConversionError::NonExistentTime(format!("{naive} in local time"))
            }),
        }
    }
}

/// ## Summary
/// Normalizes a raw zone label to an IANA zone id.
///
/// Returns the input unchanged when nothing recognizes it, and `None` only
/// when no label was given.
#[must_use]
pub fn normalize_zone(label: Option<&str>) -> Option<String> {
    label.map(normalize_label)
}

fn normalize_label(label: &str) -> String {
    let trimmed = label.trim();

    if let Some(iana) = lookup_display_name(strip_offset_prefix(trimmed)) {
        return iana.to_string();
    }

    // Strip common vendor prefixes
    let stripped = trimmed
        .strip_prefix("/mozilla.org/")
        .or_else(|| trimmed.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(trimmed);

    // Windows zone ids ("Eastern Standard Time") via ICU
    let windows_parser = WindowsParser::new();
    if let Some(tz) = windows_parser.parse(stripped, None) {
        let iana_parser = IanaParserExtended::new();
        for entry in iana_parser.iter() {
            if entry.time_zone == tz {
                return entry.canonical.to_string();
            }
        }
    }

    // IANA canonicalization (Europe/Kiev -> Europe/Kyiv, US/Eastern -> America/New_York)
    let iana_parser = IanaParserExtended::new();
    let parsed = iana_parser.parse(stripped);
    if parsed.time_zone != icu::time::TimeZone::UNKNOWN {
        return parsed.canonical.to_string();
    }

    trimmed.to_string()
}

/// ## Summary
/// Converts a raw DATE or DATE-TIME value and optional `TZID` to UTC.
///
/// One-shot form of [`TimeZoneResolver::convert`]; returns `None` on any
/// failure.
#[must_use]
pub fn to_utc(
    value: &str,
    tzid: Option<&str>,
    floating: FloatingTime,
) -> Option<DateTime<Utc>> {
    TimeZoneResolver::new(floating).convert(value, tzid).ok()
}

/// ## Summary
/// Finds the instant that displays as `naive` in `zone`.
///
/// Readings inside a spring-forward gap are shifted forward by one hour;
/// readings inside a fall-back fold take the earlier instant.
#[must_use]
pub fn local_wall_clock_to_utc<Z: TimeZone>(
    zone: &Z,
    naive: NaiveDateTime,
) -> Option<DateTime<Utc>> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        LocalResult::None => match zone.from_local_datetime(&(naive + TimeDelta::hours(1))) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                Some(dt.with_timezone(&Utc))
            }
            LocalResult::None => None,
        },
    }
}
