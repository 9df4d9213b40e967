use calfeed_core::types::TimeWindow;
use chrono::{DateTime, TimeDelta, Utc};
use std::str::FromStr;

use crate::ical::RecurrenceMaster;
use crate::ical::expand::{AnchorZone, occurrences};

pub struct RecurrenceCase {
    pub name: &'static str,
    pub dtstart: &'static str,
    /// IANA zone the series is anchored in; UTC when absent.
    pub zone: Option<&'static str>,
    pub rrule: &'static str,
    pub exdates: &'static [&'static str],
    pub window: (&'static str, &'static str),
    pub expected: &'static [&'static str],
}

const WIDE: (&str, &str) = ("1990-01-01T00:00:00Z", "2030-12-31T23:59:59Z");

#[expect(clippy::too_many_lines)]
pub fn recurrence_cases() -> Vec<RecurrenceCase> {
    vec![
        RecurrenceCase {
            name: "daily_count",
            dtstart: "2012-02-01T09:30:00Z",
            zone: None,
            rrule: "FREQ=DAILY;COUNT=3",
            exdates: &[],
            window: WIDE,
            expected: &[
                "2012-02-01T09:30:00Z",
                "2012-02-02T09:30:00Z",
                "2012-02-03T09:30:00Z",
            ],
        },
        RecurrenceCase {
            name: "weekly_byday",
            dtstart: "1997-09-02T09:00:00Z",
            zone: None,
            rrule: "FREQ=WEEKLY;COUNT=3;BYDAY=TU,TH",
            exdates: &[],
            window: WIDE,
            expected: &[
                "1997-09-02T09:00:00Z",
                "1997-09-04T09:00:00Z",
                "1997-09-09T09:00:00Z",
            ],
        },
        RecurrenceCase {
            name: "monthly_bymonthday",
            dtstart: "2012-01-01T09:00:00Z",
            zone: None,
            rrule: "FREQ=MONTHLY;COUNT=3;BYMONTHDAY=1",
            exdates: &[],
            window: WIDE,
            expected: &[
                "2012-01-01T09:00:00Z",
                "2012-02-01T09:00:00Z",
                "2012-03-01T09:00:00Z",
            ],
        },
        RecurrenceCase {
            name: "monthly_last_friday",
            dtstart: "2025-01-31T17:00:00Z",
            zone: None,
            rrule: "FREQ=MONTHLY;BYDAY=-1FR;COUNT=3",
            exdates: &[],
            window: WIDE,
            expected: &[
                "2025-01-31T17:00:00Z",
                "2025-02-28T17:00:00Z",
                "2025-03-28T17:00:00Z",
            ],
        },
        RecurrenceCase {
            name: "daily_interval",
            dtstart: "2025-01-01T10:00:00Z",
            zone: None,
            rrule: "FREQ=DAILY;INTERVAL=10;COUNT=3",
            exdates: &[],
            window: WIDE,
            expected: &[
                "2025-01-01T10:00:00Z",
                "2025-01-11T10:00:00Z",
                "2025-01-21T10:00:00Z",
            ],
        },
        RecurrenceCase {
            name: "daily_until",
            dtstart: "2025-01-01T10:00:00Z",
            zone: None,
            rrule: "FREQ=DAILY;UNTIL=20250103T100000Z",
            exdates: &[],
            window: WIDE,
            expected: &[
                "2025-01-01T10:00:00Z",
                "2025-01-02T10:00:00Z",
                "2025-01-03T10:00:00Z",
            ],
        },
        RecurrenceCase {
            name: "unbounded_rule_clipped_by_window",
            dtstart: "2025-01-01T12:00:00Z",
            zone: None,
            rrule: "FREQ=DAILY",
            exdates: &[],
            window: ("2025-01-10T00:00:00Z", "2025-01-12T23:59:59Z"),
            expected: &[
                "2025-01-10T12:00:00Z",
                "2025-01-11T12:00:00Z",
                "2025-01-12T12:00:00Z",
            ],
        },
        RecurrenceCase {
            name: "weekly_exdate",
            dtstart: "2025-01-06T08:00:00Z",
            zone: None,
            rrule: "FREQ=WEEKLY;COUNT=3",
            exdates: &["2025-01-13T08:00:00Z"],
            window: WIDE,
            expected: &["2025-01-06T08:00:00Z", "2025-01-20T08:00:00Z"],
        },
        RecurrenceCase {
            name: "new_york_spring_forward",
            dtstart: "2025-03-03T14:00:00Z",
            zone: Some("America/New_York"),
            rrule: "FREQ=WEEKLY;COUNT=3",
            exdates: &[],
            window: WIDE,
            expected: &[
                "2025-03-03T14:00:00Z",
                "2025-03-10T13:00:00Z",
                "2025-03-17T13:00:00Z",
            ],
        },
        RecurrenceCase {
            name: "berlin_fall_back",
            dtstart: "2025-10-20T08:00:00Z",
            zone: Some("Europe/Berlin"),
            rrule: "FREQ=WEEKLY;COUNT=2",
            exdates: &[],
            window: WIDE,
            expected: &["2025-10-20T08:00:00Z", "2025-10-27T09:00:00Z"],
        },
    ]
}

pub fn assert_case(case: &RecurrenceCase) {
    let start = parse_rfc3339(case.dtstart);
    let anchor = case.zone.map_or(AnchorZone::Utc, |zone| {
        AnchorZone::Zone(
            chrono_tz::Tz::from_str(zone)
                .unwrap_or_else(|err| panic!("Unknown zone in {}: {err}", case.name)),
        )
    });

    let master = RecurrenceMaster {
        uid: case.name.to_string(),
        summary: case.name.to_string(),
        location: None,
        start,
        end: start + TimeDelta::hours(1),
        rrule: case.rrule.to_string(),
        anchor,
        exdates: case.exdates.iter().map(|value| parse_rfc3339(value)).collect(),
    };
    let window = TimeWindow::new(parse_rfc3339(case.window.0), parse_rfc3339(case.window.1));

    let actual = occurrences(&master, &window)
        .unwrap_or_else(|err| panic!("Failed to expand {}: {err}", case.name));
    let expected: Vec<DateTime<Utc>> = case
        .expected
        .iter()
        .map(|value| parse_rfc3339(value))
        .collect();

    assert_eq!(actual, expected, "Case {} did not match", case.name);
}

fn parse_rfc3339(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .unwrap_or_else(|err| panic!("Failed to parse rfc3339 value {value}: {err}"))
        .with_timezone(&Utc)
}
