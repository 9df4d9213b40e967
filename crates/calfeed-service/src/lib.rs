//! Feed fetching and aggregation: turns a list of calendar sources into one
//! sorted list of events for a visible window.

pub mod agenda;
pub mod error;
pub mod feed;
pub mod window;
