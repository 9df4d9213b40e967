//! RFC 5545 event extraction: content-line lexing, `VEVENT` block parsing,
//! time zone normalization and recurrence expansion.

pub mod error;
pub mod ical;
