//! Plain-text agenda output.

use std::fmt::Display;
use std::io::{self, Write};

use calfeed_core::types::CalendarEvent;
use calfeed_service::agenda::AgendaDay;
use chrono::TimeZone;

/// Writes one heading per day followed by its events, one per line.
pub fn write_agenda<W: Write, Z: TimeZone>(
    out: &mut W,
    days: &[AgendaDay],
    zone: &Z,
) -> io::Result<()>
where
    Z::Offset: Display,
{
    if days.is_empty() {
        return writeln!(out, "No events.");
    }

    for (i, day) in days.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "{}", day.date.format("%a %d %b %Y"))?;
        for event in &day.events {
            writeln!(out, "  {:<12} {}", time_column(event, zone), describe(event))?;
        }
    }

    Ok(())
}

fn time_column<Z: TimeZone>(event: &CalendarEvent, zone: &Z) -> String
where
    Z::Offset: Display,
{
    if event.is_all_day() {
        return "all day".to_string();
    }

    let start = event.start.with_timezone(zone);
    let end = event.end.with_timezone(zone);
    if end <= start {
        start.format("%H:%M").to_string()
    } else {
        format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"))
    }
}

fn describe(event: &CalendarEvent) -> String {
    let mut line = event.subject.clone();
    if let Some(location) = event.location.as_deref() {
        line.push_str(" @ ");
        line.push_str(location);
    }
    if let Some(calendar) = event.calendar_name.as_deref() {
        line.push_str(" [");
        line.push_str(calendar);
        line.push(']');
    }
    line
}
