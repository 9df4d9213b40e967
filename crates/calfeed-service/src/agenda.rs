//! Day-by-day grouping of a sorted event list.

use calfeed_core::types::CalendarEvent;
use chrono::{NaiveDate, TimeZone};
use serde::Serialize;
use std::collections::BTreeMap;

/// The events to show under one date heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgendaDay {
    pub date: NaiveDate,
    pub events: Vec<CalendarEvent>,
}

/// ## Summary
/// Groups events by the day they fall on in `zone`, days ascending.
///
/// Timed events are placed on the local date of their start. All-day events
/// keep their calendar dates (they are stored at UTC midnight) and are listed
/// on every day they cover, end exclusive. Within a day the input order is
/// kept.
#[must_use]
pub fn group_by_day<Z: TimeZone>(events: &[CalendarEvent], zone: &Z) -> Vec<AgendaDay> {
    let mut days: BTreeMap<NaiveDate, Vec<CalendarEvent>> = BTreeMap::new();

    for event in events {
        if event.is_all_day() {
            let first = event.start.date_naive();
            let last = event.effective_end().date_naive().max(first);
            for date in first.iter_days().take_while(|date| *date <= last) {
                days.entry(date).or_default().push(event.clone());
            }
        } else {
            let date = event.start.with_timezone(zone).date_naive();
            days.entry(date).or_default().push(event.clone());
        }
    }

    days.into_iter()
        .map(|(date, events)| AgendaDay { date, events })
        .collect()
}
