//! Fan-out over the configured sources, fan-in into one sorted list.

use calfeed_core::config::Settings;
use calfeed_core::constants::DEFAULT_BUFFER_HOURS;
use calfeed_core::types::{CalendarEvent, CalendarSource, FloatingTime, TimeWindow};
use calfeed_rfc::ical::parse::has_event_blocks;
use calfeed_rfc::ical::{ParseOptions, parse_feed};
use chrono::TimeDelta;
use futures::future::join_all;

use super::fetch::FeedFetcher;
use crate::error::{FetchError, ServiceError, ServiceResult};
use crate::window::{VisibleWindow, overlaps_window};

/// Tunables for one aggregation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedOptions {
    /// Padding added to both ends of the visible window.
    pub buffer: TimeDelta,
    pub floating: FloatingTime,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            buffer: TimeDelta::hours(i64::from(DEFAULT_BUFFER_HOURS)),
            floating: FloatingTime::default(),
        }
    }
}

impl FeedOptions {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            buffer: TimeDelta::hours(i64::from(settings.window.buffer_hours)),
            floating: settings.parse.floating_time,
        }
    }
}

/// ## Summary
/// Fetches every active source and returns the events visible from today.
///
/// The window covers `days_before` days back through `days_ahead` days on,
/// in the process's local zone, padded by `options.buffer`.
///
/// ## Errors
/// See [`fetch_events_in_window`]; additionally fails if the window cannot
/// be computed.
pub async fn fetch_events<F: FeedFetcher>(
    fetcher: &F,
    sources: &[CalendarSource],
    days_before: u32,
    days_ahead: u32,
    options: &FeedOptions,
) -> ServiceResult<Vec<CalendarEvent>> {
    let window = VisibleWindow::new(days_before, days_ahead)
        .with_buffer(options.buffer)
        .from_today()?;

    fetch_events_in_window(fetcher, sources, window, options).await
}

/// ## Summary
/// Fetches every active source concurrently and returns the events that
/// overlap `window`, sorted by start.
///
/// A failing source is logged and contributes nothing.
///
/// ## Errors
/// Returns `ServiceError::NoEnabledSources` before fetching anything when no
/// source is enabled with a URL, and `ServiceError::AllSourcesFailed` when
/// every source failed.
#[tracing::instrument(
    skip_all,
    fields(sources = sources.len(), window_start = %window.start, window_end = %window.end)
)]
pub async fn fetch_events_in_window<F: FeedFetcher>(
    fetcher: &F,
    sources: &[CalendarSource],
    window: TimeWindow,
    options: &FeedOptions,
) -> ServiceResult<Vec<CalendarEvent>> {
    let active: Vec<&CalendarSource> = sources.iter().filter(|source| source.is_active()).collect();
    if active.is_empty() {
        return Err(ServiceError::NoEnabledSources);
    }

    let parse_options = ParseOptions::new(window).with_floating(options.floating);
    let results = join_all(
        active
            .iter()
            .map(|source| fetch_source(fetcher, source, &parse_options)),
    )
    .await;

    let mut events = Vec::new();
    let mut failed = 0_usize;
    for (source, result) in active.iter().zip(results) {
        match result {
            Ok(source_events) => {
                tracing::debug!(source = %source.id, events = source_events.len(), "Source parsed");
                events.extend(source_events);
            }
            Err(err) => {
                failed += 1;
                tracing::warn!(
                    source = %source.id,
                    url = %source.url,
                    error = %err,
                    "Calendar source failed"
                );
            }
        }
    }

    if failed == active.len() {
        return Err(ServiceError::AllSourcesFailed { failed });
    }

    events.retain(|event| overlaps_window(event, &window));
    events.sort_by_key(|event| event.start);

    tracing::info!(events = events.len(), failed, "Fetched calendar events");

    Ok(events)
}

/// ## Summary
/// Fetches and parses one source, tagging each event with it.
///
/// Events are expanded within the options' window but not filtered or
/// sorted.
///
/// ## Errors
/// Returns `ServiceError::FetchError` if the fetch fails or the body has no
/// `VEVENT`.
pub async fn fetch_source<F: FeedFetcher>(
    fetcher: &F,
    source: &CalendarSource,
    options: &ParseOptions,
) -> ServiceResult<Vec<CalendarEvent>> {
    let text = fetcher.fetch(&source.url).await?;

    if !has_event_blocks(&text) {
        return Err(FetchError::MalformedFeed {
            url: source.url.clone(),
        }
        .into());
    }

    Ok(parse_feed(&text, options)
        .into_iter()
        .map(|event| event.with_source(source))
        .collect())
}
