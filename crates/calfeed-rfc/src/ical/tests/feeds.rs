//! Feed-level scenarios: parse a whole document and check the events.

use calfeed_core::types::{CalendarEvent, FloatingTime, TimeWindow};
use chrono::{DateTime, TimeZone, Utc};

use super::fixtures::{OUTLOOK_EXPORT, WEEKLY_SERIES, WEEKLY_SERIES_WITH_EXCEPTIONS};
use crate::ical::{ParseOptions, parse_feed};

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn options(start: DateTime<Utc>, end: DateTime<Utc>) -> ParseOptions {
    ParseOptions::new(TimeWindow::new(start, end)).with_floating(FloatingTime::Utc)
}

fn year_2025() -> ParseOptions {
    options(utc(2025, 1, 1, 0, 0), utc(2025, 12, 31, 23, 59))
}

fn sorted(mut events: Vec<CalendarEvent>) -> Vec<CalendarEvent> {
    events.sort_by_key(|event| event.start);
    events
}

#[test_log::test]
fn test_weekly_series_expands_in_zone() {
    let events = sorted(parse_feed(WEEKLY_SERIES, &year_2025()));

    let starts: Vec<_> = events.iter().map(|e| e.start).collect();
    assert_eq!(
        starts,
        vec![
            utc(2025, 3, 3, 9, 0),
            utc(2025, 3, 10, 9, 0),
            utc(2025, 3, 17, 9, 0),
            utc(2025, 3, 24, 9, 0),
        ]
    );
    assert!(events.iter().all(|e| e.is_recurring));
    assert!(events.iter().all(|e| e.end - e.start == chrono::TimeDelta::minutes(30)));
    assert_eq!(events[0].id, "weekly@example.com-2025-03-03T09:00:00.000Z");
    assert_eq!(events[0].location.as_deref(), Some("Room 4"));
}

#[test_log::test]
fn test_cancellation_removes_one_occurrence() {
    let plain = parse_feed(WEEKLY_SERIES, &year_2025());
    let with_exceptions = parse_feed(WEEKLY_SERIES_WITH_EXCEPTIONS, &year_2025());

    assert_eq!(with_exceptions.len(), plain.len() - 1);
    assert!(with_exceptions.iter().all(|e| e.start != utc(2025, 3, 10, 9, 0)));
}

#[test_log::test]
fn test_override_replaces_only_its_occurrence() {
    let events = sorted(parse_feed(WEEKLY_SERIES_WITH_EXCEPTIONS, &year_2025()));

    let moved: Vec<_> = events
        .iter()
        .filter(|e| e.subject == "Team sync (moved)")
        .collect();
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].start, utc(2025, 3, 18, 14, 0));
    assert_eq!(moved[0].end, utc(2025, 3, 18, 15, 0));
    assert_eq!(moved[0].location.as_deref(), Some("Roof terrace"));
    assert!(moved[0].is_recurring);

    assert!(events.iter().all(|e| e.start != utc(2025, 3, 17, 9, 0)));
    let untouched = events.iter().filter(|e| e.subject == "Team sync").count();
    assert_eq!(untouched, 2);
}

#[test_log::test]
fn test_overrides_without_master_are_kept() {
    let feed = WEEKLY_SERIES_WITH_EXCEPTIONS.replacen(
        "RRULE:FREQ=WEEKLY;BYDAY=MO;COUNT=4\r\n",
        "",
        1,
    );
    let events = parse_feed(&feed, &year_2025());

    // The former master is now a plain event, the cancellation has nothing
    // to cancel and the override stands alone.
    assert_eq!(events.len(), 2);
    assert!(events.iter().any(|e| e.subject == "Team sync (moved)"));
}

#[test_log::test]
fn test_expansion_is_bounded_by_window() {
    let events = parse_feed(
        WEEKLY_SERIES,
        &options(utc(2025, 3, 9, 0, 0), utc(2025, 3, 17, 9, 0)),
    );
    let starts: Vec<_> = sorted(events).iter().map(|e| e.start).collect();
    assert_eq!(starts, vec![utc(2025, 3, 10, 9, 0), utc(2025, 3, 17, 9, 0)]);
}

#[test_log::test]
fn test_outlook_export() {
    let events = sorted(parse_feed(OUTLOOK_EXPORT, &year_2025()));
    assert_eq!(events.len(), 2);

    let offsite = &events[0];
    assert_eq!(offsite.start, utc(2025, 1, 10, 0, 0));
    assert_eq!(offsite.end, utc(2025, 1, 12, 0, 0));
    assert!(offsite.is_all_day());
    assert_eq!(offsite.effective_end(), utc(2025, 1, 11, 0, 0));

    let planning = &events[1];
    assert_eq!(
        planning.subject,
        "Quarterly planning with the regional leadership team"
    );
    assert_eq!(planning.start, utc(2025, 3, 15, 13, 0));
    assert_eq!(planning.end, utc(2025, 3, 15, 14, 0));
    assert_eq!(planning.location.as_deref(), Some("Conference Room B, 2nd floor"));
    assert!(!planning.is_recurring);
}

#[test]
fn test_exdate_and_duration() {
    let feed = "BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\n\
UID:daily\r\n\
SUMMARY:Check-in\r\n\
DTSTART:20250601T080000Z\r\n\
DURATION:PT15M\r\n\
RRULE:FREQ=DAILY;COUNT=5\r\n\
EXDATE:20250602T080000Z,20250604T080000Z\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    let events = sorted(parse_feed(feed, &year_2025()));
    let starts: Vec<_> = events.iter().map(|e| e.start).collect();
    assert_eq!(
        starts,
        vec![utc(2025, 6, 1, 8, 0), utc(2025, 6, 3, 8, 0), utc(2025, 6, 5, 8, 0)]
    );
    assert!(events.iter().all(|e| e.end - e.start == chrono::TimeDelta::minutes(15)));
}

#[test]
fn test_unusable_blocks_are_skipped() {
    let feed = "BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:No uid\r\n\
DTSTART:20250601T080000Z\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:bad-start\r\n\
DTSTART:tomorrow\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:unknown-zone\r\n\
DTSTART;TZID=Atlantis/Central:20250601T080000\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:bad-rule\r\n\
DTSTART:20250601T080000Z\r\n\
RRULE:FREQ=FORTNIGHTLY\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:ok\r\n\
DTSTART:20250601T080000Z\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    let events = parse_feed(feed, &year_2025());
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, "ok-2025-06-01T08:00:00.000Z");
    assert_eq!(events[0].subject, "(No title)");
}

#[test_log::test]
fn test_out_of_range_duration_falls_back_to_start() {
    let feed = "BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\n\
UID:far-end\r\n\
DTSTART:20250601T080000Z\r\n\
DURATION:P1000000000W\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:huge-weeks\r\n\
DTSTART:20250602T080000Z\r\n\
DURATION:P99999999999W\r\n\
RRULE:FREQ=DAILY;COUNT=2\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:ok\r\n\
DTSTART:20250601T090000Z\r\n\
DURATION:PT30M\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    let events = sorted(parse_feed(feed, &year_2025()));
    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "far-end-2025-06-01T08:00:00.000Z",
            "ok-2025-06-01T09:00:00.000Z",
            "huge-weeks-2025-06-02T08:00:00.000Z",
            "huge-weeks-2025-06-03T08:00:00.000Z",
        ]
    );
    assert_eq!(events[1].end, utc(2025, 6, 1, 9, 30));
    assert!(
        events
            .iter()
            .filter(|e| !e.id.starts_with("ok-"))
            .all(|e| e.end == e.start)
    );
}

#[test]
fn test_non_calendar_input_yields_nothing() {
    assert!(parse_feed("", &year_2025()).is_empty());
    assert!(parse_feed("<html><body>Sign in</body></html>", &year_2025()).is_empty());
}
