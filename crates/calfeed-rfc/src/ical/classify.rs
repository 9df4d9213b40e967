//! Turns raw `VEVENT` blocks into typed series parts and standalone events.

use calfeed_core::types::CalendarEvent;
use chrono::{DateTime, TimeDelta, Utc};

use super::expand::{AnchorZone, TimeZoneResolver};
use super::parse::{RawDate, RawEventBlock, parse_duration};

/// Subject used when a `VEVENT` has no `SUMMARY`.
pub const UNTITLED_SUBJECT: &str = "(No title)";

/// Identifies one occurrence of a series: its uid and original start.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceKey {
    pub uid: String,
    pub start: DateTime<Utc>,
}

/// A recurring event definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceMaster {
    pub uid: String,
    pub summary: String,
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// `RRULE` value, without the property name.
    pub rrule: String,
    /// Zone the rule's wall-clock times are generated in.
    pub anchor: AnchorZone,
    /// `EXDATE` instants that never occur.
    pub exdates: Vec<DateTime<Utc>>,
}

impl RecurrenceMaster {
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// What a single `VEVENT` block contributes to a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockClass {
    Master(RecurrenceMaster),
    Override { key: InstanceKey, event: CalendarEvent },
    Cancellation(InstanceKey),
    Standalone(CalendarEvent),
}

/// ## Summary
/// Classifies one block.
///
/// Returns `None` for blocks that contribute nothing: a missing `UID`, a
/// `DTSTART` that cannot be converted, an unconvertible `RECURRENCE-ID`, or a
/// cancelled non-recurring event.
pub fn classify(block: &RawEventBlock, resolver: &mut TimeZoneResolver) -> Option<BlockClass> {
    let Some(uid) = block.uid.as_deref().filter(|uid| !uid.is_empty()) else {
        tracing::trace!(line = block.line, "Dropping VEVENT without UID");
        return None;
    };

    let Some(dtstart) = block.dtstart.as_ref() else {
        tracing::trace!(line = block.line, uid, "Dropping VEVENT without DTSTART");
        return None;
    };
    let start = match resolver.convert(&dtstart.value, dtstart.tzid.as_deref()) {
        Ok(start) => start,
        Err(err) => {
            tracing::trace!(
                line = block.line,
                uid,
                error = %err,
                "Dropping VEVENT with unusable DTSTART"
            );
            return None;
        }
    };
    let end = resolve_end(block, dtstart, start, resolver);

    if let Some(recurrence_id) = block.recurrence_id.as_ref() {
        let original =
            match resolver.convert(&recurrence_id.value, recurrence_id.tzid.as_deref()) {
                Ok(original) => original,
                Err(err) => {
                    tracing::trace!(
                        line = block.line,
                        uid,
                        error = %err,
                        "Dropping VEVENT with unusable RECURRENCE-ID"
                    );
                    return None;
                }
            };
        let key = InstanceKey {
            uid: uid.to_string(),
            start: original,
        };

        if block.cancelled {
            return Some(BlockClass::Cancellation(key));
        }

        let event = build_event(block, uid, start, end, true);
        return Some(BlockClass::Override { key, event });
    }

    if let Some(rrule) = block.rrule.as_deref() {
        let exdates = block
            .exdates
            .iter()
            .filter_map(|exdate| {
                resolver
                    .convert(&exdate.value, exdate.tzid.as_deref())
                    .inspect_err(|err| {
                        tracing::trace!(uid, error = %err, "Ignoring unusable EXDATE");
                    })
                    .ok()
            })
            .collect();

        return Some(BlockClass::Master(RecurrenceMaster {
            uid: uid.to_string(),
            summary: subject(block),
            location: block.location.clone(),
            start,
            end,
            rrule: rrule.to_string(),
            anchor: resolver.anchor_for(&dtstart.value, dtstart.tzid.as_deref()),
            exdates,
        }));
    }

    if block.cancelled {
        tracing::trace!(line = block.line, uid, "Dropping cancelled event");
        return None;
    }

    Some(BlockClass::Standalone(build_event(block, uid, start, end, false)))
}

/// `DTEND`, else `DURATION`, else one day for a date-only start, else the
/// start itself.
fn resolve_end(
    block: &RawEventBlock,
    dtstart: &RawDate,
    start: DateTime<Utc>,
    resolver: &mut TimeZoneResolver,
) -> DateTime<Utc> {
    if let Some(dtend) = block.dtend.as_ref() {
        match resolver.convert(&dtend.value, dtend.tzid.as_deref()) {
            Ok(end) => return end,
            Err(err) => tracing::trace!(line = block.line, error = %err, "Ignoring unusable DTEND"),
        }
    }

    if let Some(duration) = block.duration.as_deref() {
        match parse_duration(duration.trim(), block.line, 1) {
            Ok(duration) => match start.checked_add_signed(duration) {
                Some(end) => return end,
                None => {
                    tracing::trace!(line = block.line, %duration, "Ignoring out-of-range DURATION");
                }
            },
            Err(err) => {
                tracing::trace!(line = block.line, error = %err, "Ignoring unusable DURATION");
            }
        }
    }

    if dtstart.value.contains('T') {
        start
    } else {
        start.checked_add_signed(TimeDelta::days(1)).unwrap_or(start)
    }
}

fn subject(block: &RawEventBlock) -> String {
    block
        .summary
        .as_deref()
        .map(str::trim)
        .filter(|summary| !summary.is_empty())
        .unwrap_or(UNTITLED_SUBJECT)
        .to_string()
}

fn build_event(
    block: &RawEventBlock,
    uid: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    is_recurring: bool,
) -> CalendarEvent {
    CalendarEvent {
        id: CalendarEvent::occurrence_id(uid, start),
        subject: subject(block),
        start,
        end,
        location: block.location.clone().filter(|location| !location.trim().is_empty()),
        is_recurring,
        calendar_id: None,
        calendar_name: None,
        calendar_color: None,
    }
}
