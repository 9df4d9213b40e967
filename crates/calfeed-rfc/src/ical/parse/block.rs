//! `VEVENT` block extraction.
//!
//! Groups content lines into one [`RawEventBlock`] per `VEVENT` and pulls out
//! the handful of properties the event pipeline reads. Everything outside a
//! `VEVENT` (calendar header, `VTIMEZONE`, `VTODO`) and everything inside a
//! nested component such as `VALARM` is ignored.

use super::lexer::{ContentLine, parse_content_line, split_lines};
use super::values::unescape_text;

/// A DATE or DATE-TIME property value together with its `TZID` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDate {
    pub value: String,
    pub tzid: Option<String>,
}

impl RawDate {
    fn from_line(line: &ContentLine) -> Self {
        Self {
            value: line.value.trim().to_string(),
            tzid: line.param("TZID"),
        }
    }
}

/// The extracted fields of one `VEVENT`, before any conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEventBlock {
    /// Line number of the `BEGIN:VEVENT` (1-based).
    pub line: usize,
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub cancelled: bool,
    pub dtstart: Option<RawDate>,
    pub dtend: Option<RawDate>,
    pub duration: Option<String>,
    pub rrule: Option<String>,
    pub recurrence_id: Option<RawDate>,
    pub exdates: Vec<RawDate>,
}

impl RawEventBlock {
    fn new(line: usize) -> Self {
        Self {
            line,
            ..Self::default()
        }
    }

    /// Records one property; the first occurrence of a single-valued
    /// property wins.
    fn apply(&mut self, line: &ContentLine) {
        match line.name.as_str() {
            "UID" => {
                self.uid
                    .get_or_insert_with(|| line.value.trim().to_string());
            }
            "SUMMARY" => {
                self.summary.get_or_insert_with(|| unescape_text(&line.value));
            }
            "LOCATION" => {
                self.location.get_or_insert_with(|| unescape_text(&line.value));
            }
            "STATUS" => {
                if line.value.trim().eq_ignore_ascii_case("CANCELLED") {
                    self.cancelled = true;
                }
            }
            "DTSTART" => {
                self.dtstart.get_or_insert_with(|| RawDate::from_line(line));
            }
            "DTEND" => {
                self.dtend.get_or_insert_with(|| RawDate::from_line(line));
            }
            "DURATION" => {
                self.duration
                    .get_or_insert_with(|| line.value.trim().to_string());
            }
            "RRULE" => {
                self.rrule.get_or_insert_with(|| line.value.trim().to_string());
            }
            "RECURRENCE-ID" => {
                self.recurrence_id
                    .get_or_insert_with(|| RawDate::from_line(line));
            }
            "EXDATE" => {
                let tzid = line.param("TZID");
                self.exdates.extend(
                    line.value
                        .split(',')
                        .map(str::trim)
                        .filter(|value| !value.is_empty())
                        .map(|value| RawDate {
                            value: value.to_string(),
                            tzid: tzid.clone(),
                        }),
                );
            }
            _ => {}
        }
    }
}

/// ## Summary
/// Returns `true` if the text contains at least one `VEVENT`.
#[must_use]
pub fn has_event_blocks(input: &str) -> bool {
    input.contains("BEGIN:VEVENT")
}

/// ## Summary
/// Splits an ICS document into raw `VEVENT` blocks.
///
/// Malformed content lines are skipped. A block left open by a missing
/// `END:VEVENT` is closed by the next `BEGIN:VEVENT` or by the end of input.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn extract_blocks(input: &str) -> Vec<RawEventBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<RawEventBlock> = None;
    // Depth of components nested inside the current VEVENT (e.g. VALARM).
    let mut nested = 0_usize;
    let mut skipped = 0_usize;

    for (line_num, raw) in split_lines(input) {
        let line = match parse_content_line(&raw, line_num) {
            Ok(line) => line,
            Err(err) => {
                tracing::trace!(error = %err, "Skipping malformed content line");
                skipped += 1;
                continue;
            }
        };

        match (line.name.as_str(), line.value.trim().to_ascii_uppercase().as_str()) {
            ("BEGIN", "VEVENT") => {
                if let Some(open) = current.take() {
                    tracing::trace!(line = open.line, "VEVENT closed by next BEGIN:VEVENT");
                    blocks.push(open);
                }
                current = Some(RawEventBlock::new(line_num));
                nested = 0;
            }
            ("END", "VEVENT") if nested == 0 => {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
            }
            ("BEGIN", _) if current.is_some() => nested += 1,
            ("END", _) if current.is_some() => nested = nested.saturating_sub(1),
            _ => {
                if nested == 0
                    && let Some(block) = current.as_mut()
                {
                    block.apply(&line);
                }
            }
        }
    }

    if let Some(open) = current {
        tracing::trace!(line = open.line, "VEVENT closed by end of input");
        blocks.push(open);
    }

    tracing::debug!(blocks = blocks.len(), skipped, "Extracted VEVENT blocks");

    blocks
}
