//! iCalendar feeds: parsing, classification and expansion into events.

pub mod classify;
pub mod expand;
pub mod feed;
pub mod parse;

#[cfg(test)]
mod tests;

pub use classify::{BlockClass, InstanceKey, RecurrenceMaster, classify};
pub use feed::{ParseOptions, parse_feed};
