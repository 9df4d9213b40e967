use chrono::{DateTime, SecondsFormat, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A configured ICS feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSource {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

impl CalendarSource {
    /// ## Summary
    /// Returns `true` if the source is enabled and has a non-blank URL.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && !self.url.trim().is_empty()
    }
}

/// How date-times without `Z` and without `TZID` are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatingTime {
    /// Wall clock of the running process (`chrono::Local`).
    #[default]
    Local,
    /// Wall clock read as UTC.
    Utc,
}

/// An inclusive range of UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// ## Summary
    /// Returns `true` if `instant` lies within the window, both ends included.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// ## Summary
    /// Returns a copy of the window widened by `margin` on both sides.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidInput` if either bound leaves the supported
    /// date range.
    pub fn widen(&self, margin: TimeDelta) -> CoreResult<Self> {
        let start = self.start.checked_sub_signed(margin);
        let end = self.end.checked_add_signed(margin);
        match (start, end) {
            (Some(start), Some(end)) => Ok(Self { start, end }),
            _ => Err(CoreError::InvalidInput(format!(
                "widening {} .. {} by {margin} is out of range",
                self.start, self.end
            ))),
        }
    }
}

/// A single event occurrence ready for display.
///
/// `start <= end` is not guaranteed; feeds do publish zero and negative
/// length events and they are passed through as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub subject: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_color: Option<String>,
}

impl CalendarEvent {
    /// ## Summary
    /// Builds the per-occurrence identifier from the series UID and the
    /// occurrence start.
    #[must_use]
    pub fn occurrence_id(uid: &str, start: DateTime<Utc>) -> String {
        format!(
            "{uid}-{}",
            start.to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }

    /// ## Summary
    /// Returns `true` if the event starts exactly at a UTC midnight.
    ///
    /// Date-only values are normalized to UTC midnight during parsing, so
    /// this is how all-day events are recognized downstream.
    #[must_use]
    pub fn is_all_day(&self) -> bool {
        self.start.num_seconds_from_midnight() == 0 && self.start.nanosecond() == 0
    }

    /// ## Summary
    /// Returns the last instant the event occupies for overlap purposes.
    ///
    /// All-day events carry an exclusive end (RFC 5545 §3.6.1), so one day
    /// is taken off.
    #[must_use]
    pub fn effective_end(&self) -> DateTime<Utc> {
        if self.is_all_day() {
            self.end - TimeDelta::days(1)
        } else {
            self.end
        }
    }

    /// ## Summary
    /// Tags the event with the calendar it was fetched from.
    #[must_use]
    pub fn with_source(mut self, source: &CalendarSource) -> Self {
        self.calendar_id = Some(source.id.clone());
        self.calendar_name = Some(source.name.clone());
        self.calendar_color = (!source.color.trim().is_empty()).then(|| source.color.clone());
        self
    }
}
