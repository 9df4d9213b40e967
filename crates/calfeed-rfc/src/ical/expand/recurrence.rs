//! Recurrence expansion with cancellations and per-instance overrides.

use calfeed_core::types::{CalendarEvent, TimeWindow};
use chrono::{DateTime, TimeDelta, Utc};
use rrule::{RRule, RRuleSet, Tz, Unvalidated};
use std::collections::{BTreeMap, BTreeSet};

use super::timezone::AnchorZone;
use crate::error::{RfcError, RfcResult};
use crate::ical::classify::{BlockClass, InstanceKey, RecurrenceMaster};

/// Everything one parse pass collects before expansion.
///
/// Created fresh for every feed; nothing here outlives a single parse.
#[derive(Debug, Default)]
pub struct FeedAccumulator {
    masters: BTreeMap<String, RecurrenceMaster>,
    overrides: BTreeMap<InstanceKey, CalendarEvent>,
    cancellations: BTreeSet<InstanceKey>,
    standalone: Vec<CalendarEvent>,
}

impl FeedAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Records one classified block. A repeated master uid replaces the
    /// earlier master; a repeated override key replaces the earlier override.
    pub fn add(&mut self, class: BlockClass) {
        match class {
            BlockClass::Master(master) => {
                if let Some(previous) = self.masters.insert(master.uid.clone(), master) {
                    tracing::trace!(uid = %previous.uid, "Replacing earlier master with same UID");
                }
            }
            BlockClass::Override { key, event } => {
                self.overrides.insert(key, event);
            }
            BlockClass::Cancellation(key) => {
                self.cancellations.insert(key);
            }
            BlockClass::Standalone(event) => self.standalone.push(event),
        }
    }

    #[must_use]
    pub fn master_count(&self) -> usize {
        self.masters.len()
    }

    /// ## Summary
    /// Expands every master within `window` and returns all events of the
    /// pass: standalone events, generated occurrences (with overrides
    /// substituted and cancellations removed) and orphan overrides.
    ///
    /// A master whose rule cannot be expanded contributes nothing.
    #[must_use]
    pub fn expand(self, window: &TimeWindow) -> Vec<CalendarEvent> {
        let Self {
            masters,
            mut overrides,
            cancellations,
            standalone: mut events,
        } = self;

        for master in masters.values() {
            let occurrences = match occurrences(master, window) {
                Ok(occurrences) => occurrences,
                Err(err) => {
                    tracing::debug!(
                        uid = %master.uid,
                        rrule = %master.rrule,
                        error = %err,
                        "Skipping unexpandable recurrence"
                    );
                    continue;
                }
            };

            let duration = master.duration();
            for start in occurrences {
                let key = InstanceKey {
                    uid: master.uid.clone(),
                    start,
                };

                if cancellations.contains(&key) {
                    tracing::trace!(uid = %master.uid, %start, "Occurrence cancelled");
                    continue;
                }

                if let Some(event) = overrides.remove(&key) {
                    events.push(event);
                    continue;
                }

                events.push(synthesize(master, start, duration));
            }
        }

        for (key, event) in overrides {
            if masters.contains_key(&key.uid) {
                tracing::trace!(
                    uid = %key.uid,
                    start = %key.start,
                    "Override slot not generated in window"
                );
            } else {
                events.push(event);
            }
        }

        events
    }
}

fn synthesize(
    master: &RecurrenceMaster,
    start: DateTime<Utc>,
    duration: TimeDelta,
) -> CalendarEvent {
    CalendarEvent {
        id: CalendarEvent::occurrence_id(&master.uid, start),
        subject: master.summary.clone(),
        start,
        end: start.checked_add_signed(duration).unwrap_or(start),
        location: master.location.clone(),
        is_recurring: true,
        calendar_id: None,
        calendar_name: None,
        calendar_color: None,
    }
}

/// ## Summary
/// Generates the start instants of `master` that fall inside `window`,
/// both ends inclusive, with `EXDATE`s removed.
///
/// ## Errors
///
/// Returns `RfcError::RecurrenceError` if the rule does not parse or does
/// not validate against its start.
pub fn occurrences(
    master: &RecurrenceMaster,
    window: &TimeWindow,
) -> RfcResult<Vec<DateTime<Utc>>> {
    let rrule_set = match build_rrule_set(master, master.anchor) {
        Ok(set) => set,
        Err(err) if master.anchor != AnchorZone::Utc => {
            // UNTIL and DTSTART must agree on their zone; retry in UTC.
            tracing::trace!(uid = %master.uid, error = %err, "Retrying recurrence anchored in UTC");
            build_rrule_set(master, AnchorZone::Utc)?
        }
        Err(err) => return Err(err),
    };

    let result = rrule_set
        .after((window.start - TimeDelta::seconds(1)).with_timezone(&Tz::UTC))
        .before((window.end + TimeDelta::seconds(1)).with_timezone(&Tz::UTC))
        .all(u16::MAX);

    if result.limited {
        tracing::warn!(
            uid = %master.uid,
            limit = u16::MAX,
            "Recurrence expansion hit the occurrence limit"
        );
    }

    Ok(result
        .dates
        .into_iter()
        .map(|date| date.with_timezone(&Utc))
        .filter(|start| window.contains(*start))
        .collect())
}

fn build_rrule_set(master: &RecurrenceMaster, anchor: AnchorZone) -> RfcResult<RRuleSet> {
    let tz = anchor.to_rrule_tz();

    let rrule = master
        .rrule
        .parse::<RRule<Unvalidated>>()
        .map_err(|err| RfcError::RecurrenceError(err.to_string()))?;
    let rrule_set = rrule
        .build(master.start.with_timezone(&tz))
        .map_err(|err| RfcError::RecurrenceError(err.to_string()))?;

    if master.exdates.is_empty() {
        return Ok(rrule_set);
    }

    let exdates = master
        .exdates
        .iter()
        .map(|exdate| exdate.with_timezone(&tz))
        .collect();
    Ok(rrule_set.set_exdates(exdates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn master(uid: &str, start: DateTime<Utc>, rrule: &str) -> RecurrenceMaster {
        RecurrenceMaster {
            uid: uid.to_string(),
            summary: "Weekly sync".to_string(),
            location: Some("Room 2".to_string()),
            start,
            end: start + TimeDelta::minutes(30),
            rrule: rrule.to_string(),
            anchor: AnchorZone::Utc,
            exdates: Vec::new(),
        }
    }

    fn march() -> TimeWindow {
        TimeWindow::new(utc(2025, 3, 1, 0, 0), utc(2025, 3, 31, 23, 59))
    }

    #[test]
    fn test_occurrences_within_window() {
        let weekly = master("w", utc(2025, 2, 3, 9, 0), "FREQ=WEEKLY;BYDAY=MO");
        let starts = occurrences(&weekly, &march()).unwrap();
        assert_eq!(
            starts,
            vec![
                utc(2025, 3, 3, 9, 0),
                utc(2025, 3, 10, 9, 0),
                utc(2025, 3, 17, 9, 0),
                utc(2025, 3, 24, 9, 0),
                utc(2025, 3, 31, 9, 0),
            ]
        );
    }

    #[test]
    fn test_occurrences_window_bounds_are_inclusive() {
        let daily = master("d", utc(2025, 3, 1, 0, 0), "FREQ=DAILY;COUNT=3");
        let window = TimeWindow::new(utc(2025, 3, 1, 0, 0), utc(2025, 3, 2, 0, 0));
        assert_eq!(
            occurrences(&daily, &window).unwrap(),
            vec![utc(2025, 3, 1, 0, 0), utc(2025, 3, 2, 0, 0)]
        );
    }

    #[test]
    fn test_exdates_are_excluded() {
        let mut weekly = master("w", utc(2025, 3, 3, 9, 0), "FREQ=WEEKLY;COUNT=4");
        weekly.exdates = vec![utc(2025, 3, 10, 9, 0)];
        assert_eq!(
            occurrences(&weekly, &march()).unwrap(),
            vec![utc(2025, 3, 3, 9, 0), utc(2025, 3, 17, 9, 0), utc(2025, 3, 24, 9, 0)]
        );
    }

    #[test]
    fn test_zone_anchor_keeps_wall_clock_across_dst() {
        // 09:00 New York, before and after the 2025-03-09 transition.
        let mut weekly = master("ny", utc(2025, 3, 3, 14, 0), "FREQ=WEEKLY;COUNT=2");
        weekly.anchor = AnchorZone::Zone(chrono_tz::Tz::America__New_York);
        assert_eq!(
            occurrences(&weekly, &march()).unwrap(),
            vec![utc(2025, 3, 3, 14, 0), utc(2025, 3, 10, 13, 0)]
        );
    }

    #[test]
    fn test_zone_anchor_with_utc_until_still_expands() {
        let mut weekly = master(
            "ny",
            utc(2025, 3, 3, 14, 0),
            "FREQ=WEEKLY;UNTIL=20250318T000000Z",
        );
        weekly.anchor = AnchorZone::Zone(chrono_tz::Tz::America__New_York);
        assert_eq!(occurrences(&weekly, &march()).unwrap().len(), 3);
    }

    #[test]
    fn test_invalid_rule_is_an_error() {
        let broken = master("b", utc(2025, 3, 3, 9, 0), "FREQ=SOMETIMES");
        assert!(matches!(
            occurrences(&broken, &march()),
            Err(RfcError::RecurrenceError(_))
        ));
    }

    #[test_log::test]
    fn test_expand_applies_cancellations_and_overrides() {
        let series = master("s", utc(2025, 3, 3, 9, 0), "FREQ=WEEKLY;COUNT=4");
        let mut acc = FeedAccumulator::new();
        acc.add(BlockClass::Master(series));
        acc.add(BlockClass::Cancellation(InstanceKey {
            uid: "s".to_string(),
            start: utc(2025, 3, 10, 9, 0),
        }));

        let moved = CalendarEvent {
            id: CalendarEvent::occurrence_id("s", utc(2025, 3, 18, 14, 0)),
            subject: "Weekly sync (moved)".to_string(),
            start: utc(2025, 3, 18, 14, 0),
            end: utc(2025, 3, 18, 15, 0),
            location: Some("Room 9".to_string()),
            is_recurring: true,
            calendar_id: None,
            calendar_name: None,
            calendar_color: None,
        };
        acc.add(BlockClass::Override {
            key: InstanceKey {
                uid: "s".to_string(),
                start: utc(2025, 3, 17, 9, 0),
            },
            event: moved.clone(),
        });

        let events = acc.expand(&march());
        let starts: Vec<_> = events.iter().map(|e| e.start).collect();
        assert_eq!(
            starts,
            vec![utc(2025, 3, 3, 9, 0), utc(2025, 3, 18, 14, 0), utc(2025, 3, 24, 9, 0)]
        );
        assert_eq!(events[1], moved);
        assert_eq!(events[0].subject, "Weekly sync");
        assert_eq!(events[0].end, utc(2025, 3, 3, 9, 30));
        assert!(events.iter().all(|e| e.is_recurring));
    }

    #[test]
    fn test_expand_orphan_and_out_of_window_overrides() {
        let orphan = CalendarEvent {
            id: CalendarEvent::occurrence_id("lonely", utc(2025, 3, 5, 12, 0)),
            subject: "Exported instance".to_string(),
            start: utc(2025, 3, 5, 12, 0),
            end: utc(2025, 3, 5, 13, 0),
            location: None,
            is_recurring: true,
            calendar_id: None,
            calendar_name: None,
            calendar_color: None,
        };
        let stale = CalendarEvent {
            subject: "Stale".to_string(),
            ..orphan.clone()
        };

        let mut acc = FeedAccumulator::new();
        acc.add(BlockClass::Master(master("s", utc(2025, 3, 3, 9, 0), "FREQ=WEEKLY;COUNT=2")));
        acc.add(BlockClass::Override {
            key: InstanceKey {
                uid: "lonely".to_string(),
                start: utc(2025, 3, 5, 12, 0),
            },
            event: orphan.clone(),
        });
        acc.add(BlockClass::Override {
            key: InstanceKey {
                uid: "s".to_string(),
                start: utc(2025, 6, 2, 9, 0),
            },
            event: stale,
        });

        let events = acc.expand(&march());
        assert_eq!(events.len(), 3);
        assert!(events.contains(&orphan));
        assert!(events.iter().all(|e| e.subject != "Stale"));
    }

    #[test]
    fn test_later_master_wins() {
        let mut acc = FeedAccumulator::new();
        acc.add(BlockClass::Master(master("s", utc(2025, 3, 3, 9, 0), "FREQ=DAILY;COUNT=5")));
        acc.add(BlockClass::Master(master("s", utc(2025, 3, 3, 9, 0), "FREQ=DAILY;COUNT=2")));
        assert_eq!(acc.master_count(), 1);
        assert_eq!(acc.expand(&march()).len(), 2);
    }

    #[test]
    fn test_occurrence_end_past_date_range_falls_back_to_start() {
        let mut long = master("l", utc(2025, 3, 3, 9, 0), "FREQ=DAILY;COUNT=2");
        long.end = DateTime::<Utc>::MAX_UTC;

        let mut acc = FeedAccumulator::new();
        acc.add(BlockClass::Master(long));
        let events = acc.expand(&march());

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].end, DateTime::<Utc>::MAX_UTC);
        assert_eq!(events[1].start, utc(2025, 3, 4, 9, 0));
        assert_eq!(events[1].end, events[1].start);
    }
}
