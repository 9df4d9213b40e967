//! Fetching feeds and merging them into one event list.

mod aggregate;
mod fetch;

pub use aggregate::{FeedOptions, fetch_events, fetch_events_in_window, fetch_source};
pub use fetch::{FeedFetcher, HttpFeedFetcher, normalize_feed_url};
