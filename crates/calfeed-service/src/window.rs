//! The visible date window and the overlap test events must pass.

use calfeed_core::constants::DEFAULT_BUFFER_HOURS;
use calfeed_core::error::{CoreError, CoreResult};
use calfeed_core::types::{CalendarEvent, TimeWindow};
use calfeed_rfc::ical::expand::local_wall_clock_to_utc;
use chrono::{Days, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};

/// A window of whole local days around "today", padded by a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleWindow {
    pub days_before: u32,
    pub days_ahead: u32,
    pub buffer: TimeDelta,
}

impl VisibleWindow {
    #[must_use]
    pub fn new(days_before: u32, days_ahead: u32) -> Self {
        Self {
            days_before,
            days_ahead,
            buffer: TimeDelta::hours(i64::from(DEFAULT_BUFFER_HOURS)),
        }
    }

    #[must_use]
    pub fn with_buffer(mut self, buffer: TimeDelta) -> Self {
        self.buffer = buffer;
        self
    }

    /// ## Summary
    /// Computes the UTC window for `today` as seen in `zone`.
    ///
    /// The window runs from local midnight `days_before` days back to local
    /// 23:59:59.999 `days_ahead` days on, then widens by the buffer on both
    /// sides.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidInput` if the day arithmetic leaves the
    /// supported date range or a boundary cannot be placed in the zone.
    pub fn around<Z: TimeZone>(&self, today: NaiveDate, zone: &Z) -> CoreResult<TimeWindow> {
        let first_day = today
            .checked_sub_days(Days::new(u64::from(self.days_before)))
            .ok_or_else(|| out_of_range(today, "days_before", self.days_before))?;
        let last_day = today
            .checked_add_days(Days::new(u64::from(self.days_ahead)))
            .ok_or_else(|| out_of_range(today, "days_ahead", self.days_ahead))?;

        let start = to_utc(zone, first_day.and_time(NaiveTime::MIN))?;
        let end = to_utc(zone, last_day.and_time(end_of_day()))?;

        TimeWindow::new(start, end).widen(self.buffer)
    }

    /// ## Summary
    /// Computes the window around today's date in the process's local zone.
    ///
    /// ## Errors
    /// See [`VisibleWindow::around`].
    pub fn from_today(&self) -> CoreResult<TimeWindow> {
        self.around(Local::now().date_naive(), &Local)
    }
}

/// 23:59:59.999
fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

fn to_utc<Z: TimeZone>(
    zone: &Z,
    naive: NaiveDateTime,
) -> CoreResult<chrono::DateTime<chrono::Utc>> {
    local_wall_clock_to_utc(zone, naive).ok_or_else(|| {
        CoreError::InvalidInput(format!("{naive} does not exist in the local zone"))
    })
}

fn out_of_range(today: NaiveDate, field: &str, days: u32) -> CoreError {
    CoreError::InvalidInput(format!("{field} = {days} is out of range from {today}"))
}

/// ## Summary
/// Returns `true` if the event should be shown for `window`.
///
/// An event is shown if it starts or ends inside the window, or spans it.
/// All-day events are compared using their inclusive last day.
#[must_use]
pub fn overlaps_window(event: &CalendarEvent, window: &TimeWindow) -> bool {
    let end = event.effective_end();

    window.contains(event.start)
        || window.contains(end)
        || (event.start <= window.start && end >= window.end)
}
