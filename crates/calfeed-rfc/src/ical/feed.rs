//! Whole-feed parsing: blocks in, expanded events out.

use calfeed_core::types::{CalendarEvent, FloatingTime, TimeWindow};

use super::classify::classify;
use super::expand::{FeedAccumulator, TimeZoneResolver};
use super::parse::extract_blocks;

/// Parameters of one feed parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Recurrences are expanded only within this window.
    pub window: TimeWindow,
    pub floating: FloatingTime,
}

impl ParseOptions {
    #[must_use]
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window,
            floating: FloatingTime::default(),
        }
    }

    #[must_use]
    pub fn with_floating(mut self, floating: FloatingTime) -> Self {
        self.floating = floating;
        self
    }
}

/// ## Summary
/// Parses an ICS document into calendar events.
///
/// Standalone events are returned as-is; recurring series are expanded within
/// `options.window` with cancellations and overrides applied. Events are not
/// filtered against the window or sorted. Blocks that cannot be used are
/// skipped, so this never fails.
#[tracing::instrument(skip(text, options), fields(input_len = text.len()))]
pub fn parse_feed(text: &str, options: &ParseOptions) -> Vec<CalendarEvent> {
    let mut resolver = TimeZoneResolver::new(options.floating);
    let mut accumulator = FeedAccumulator::new();

    let blocks = extract_blocks(text);
    let block_count = blocks.len();
    for block in &blocks {
        if let Some(class) = classify(block, &mut resolver) {
            accumulator.add(class);
        }
    }

    let masters = accumulator.master_count();
    let events = accumulator.expand(&options.window);

    tracing::debug!(
        blocks = block_count,
        masters,
        events = events.len(),
        "Parsed feed"
    );

    events
}
