//! Content line lexer for iCalendar (RFC 5545 §3.1).
//!
//! Handles line unfolding and tokenization of content lines.

use super::error::{ParseError, ParseErrorKind, ParseResult};

/// A property parameter such as `TZID=Europe/Berlin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Upper-cased parameter name.
    pub name: String,
    /// Comma separated values, unquoted.
    pub values: Vec<String>,
}

/// A single tokenized content line: `name *(";" param) ":" value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Upper-cased property name.
    pub name: String,
    pub params: Vec<Parameter>,
    /// Everything after the colon that ends the parameter list, untouched.
    pub value: String,
}

impl ContentLine {
    /// ## Summary
    /// Returns the value of the named parameter, with multiple values
    /// re-joined by commas.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<String> {
        self.params
            .iter()
            .find(|param| param.name.eq_ignore_ascii_case(name))
            .map(|param| param.values.join(","))
    }
}

/// Splits input into content lines, merging folded continuations.
///
/// Handles both CRLF and bare LF line endings. Lines starting with SP/HTAB are
/// treated as continuations of the previous line. Per RFC 5545 §3.1, unfolding
/// removes the line break and the whitespace character (no space is inserted).
#[must_use]
pub fn split_lines(input: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();

    for (i, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        if let Some(continuation) = line.strip_prefix([' ', '\t']) {
            if let Some((_, prev)) = lines.last_mut() {
                prev.push_str(continuation);
            } else {
                lines.push((i + 1, continuation.to_string()));
            }
        } else if !line.contains(':') {
            // Lenient: treat lines without a colon as folded continuations.
            if let Some((_, prev)) = lines.last_mut() {
                prev.push_str(line);
            } else {
                lines.push((i + 1, line.to_string()));
            }
        } else {
            lines.push((i + 1, line.to_string()));
        }
    }

    lines
}

/// Parses a single content line.
///
/// Format: `name *(";" param) ":" value`
///
/// ## Errors
/// Returns an error if the line is malformed or contains invalid characters.
pub fn parse_content_line(line: &str, line_num: usize) -> ParseResult<ContentLine> {
    let name_end = line
        .find([';', ':'])
        .ok_or_else(|| ParseError::new(ParseErrorKind::MissingColon, line_num, line.len()))?;

    if name_end == 0 {
        return Err(ParseError::new(
            ParseErrorKind::MissingPropertyName,
            line_num,
            1,
        ));
    }

    let name = &line[..name_end];
    if let Some(bad) = name.find(|c: char| !c.is_ascii_alphanumeric() && c != '-') {
        return Err(ParseError::new(
            ParseErrorKind::InvalidPropertyName,
            line_num,
            bad + 1,
        ));
    }

    let mut params = Vec::new();
    let mut rest = &line[name_end..];
    let mut offset = name_end;
    while let Some(after_semicolon) = rest.strip_prefix(';') {
        let (param, consumed) = parse_parameter(after_semicolon, line_num, offset + 2)?;
        params.push(param);
        rest = &after_semicolon[consumed..];
        offset += 1 + consumed;
    }

    let value = rest
        .strip_prefix(':')
        .ok_or_else(|| ParseError::new(ParseErrorKind::MissingColon, line_num, offset + 1))?;

    Ok(ContentLine {
        name: name.to_ascii_uppercase(),
        params,
        value: value.to_string(),
    })
}

/// Parses `NAME=value *("," value)` from the start of `input`.
///
/// Stops in front of the `;` or `:` that ends the parameter and returns the
/// number of bytes consumed.
fn parse_parameter(
    input: &str,
    line_num: usize,
    column: usize,
) -> ParseResult<(Parameter, usize)> {
    let eq = input
        .find('=')
        .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidParameter, line_num, column))?;

    let name = &input[..eq];
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ParseError::new(
            ParseErrorKind::InvalidParameter,
            line_num,
            column,
        ));
    }

    let mut values = Vec::new();
    let mut pos = eq + 1;
    loop {
        let (value, len) = parse_param_value(&input[pos..], line_num, column + pos)?;
        values.push(value);
        pos += len;

        match input[pos..].chars().next() {
            Some(',') => pos += 1,
            Some(';' | ':') => break,
            Some(c) => {
                return Err(
                    ParseError::new(ParseErrorKind::InvalidParameter, line_num, column + pos)
                        .with_context(format!("unexpected character '{c}'")),
                );
            }
            None => {
                return Err(ParseError::new(
                    ParseErrorKind::MissingColon,
                    line_num,
                    column + pos,
                ));
            }
        }
    }

    Ok((
        Parameter {
            name: name.to_ascii_uppercase(),
            values,
        },
        pos,
    ))
}

/// Parses a parameter value (possibly quoted).
///
/// Unquoted values end at the first `,`, `;` or `:` outside parentheses, so
/// Outlook's unquoted `TZID=(UTC-05:00) Eastern Time (US & Canada)` survives.
fn parse_param_value(input: &str, line_num: usize, column: usize) -> ParseResult<(String, usize)> {
    if let Some(quoted) = input.strip_prefix('"') {
        let close = quoted
            .find('"')
            .ok_or_else(|| ParseError::new(ParseErrorKind::UnclosedQuote, line_num, column))?;
        return Ok((quoted[..close].to_string(), close + 2));
    }

    let mut depth = 0_usize;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' | ';' | ':' if depth == 0 => return Ok((input[..i].to_string(), i)),
            _ => {}
        }
    }

    Err(ParseError::new(
        ParseErrorKind::MissingColon,
        line_num,
        column + input.len(),
    ))
}
