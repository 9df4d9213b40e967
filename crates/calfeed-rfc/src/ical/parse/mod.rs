//! iCalendar event extraction (RFC 5545).
//!
//! Lexes content lines and collects the properties of each `VEVENT` into a
//! [`RawEventBlock`]. Values are kept as text; conversion to instants happens
//! in [`crate::ical::expand`].
//!
//! ## Usage
//!
//! ```rust
//! use calfeed_rfc::ical::parse::extract_blocks;
//!
//! let input = "\
//! BEGIN:VCALENDAR\r\n\
//! BEGIN:VEVENT\r\n\
//! UID:standup@example.com\r\n\
//! SUMMARY:Stand-up\r\n\
//! DTSTART;TZID=Europe/Berlin:20250310T093000\r\n\
//! END:VEVENT\r\n\
//! END:VCALENDAR\r\n";
//!
//! let blocks = extract_blocks(input);
//! assert_eq!(blocks[0].summary.as_deref(), Some("Stand-up"));
//! ```
//!
//! ## Features
//!
//! - Handles line folding/unfolding with CRLF or bare LF
//! - Quoted and parenthesized parameter values (Outlook `TZID`s)
//! - Ignores `VTIMEZONE`, `VTODO` and nested `VALARM` components
//! - Skips malformed lines instead of failing the feed

mod block;
mod error;
mod lexer;
mod values;

pub use block::{RawDate, RawEventBlock, extract_blocks, has_event_blocks};
pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use lexer::{ContentLine, Parameter, parse_content_line, split_lines};
pub use values::{
    DateValue, parse_date, parse_date_value, parse_duration, parse_time, unescape_text,
};
