//! Comment-to-command parsing.
//!
//! A command is a comment that starts with the bot mention followed by a
//! keyword: `log`, `delete`, or `show`. A log body is comma-separated
//! entries of `<date> <duration> ["description"]`; commas inside double
//! quotes do not split, so descriptions can contain them. A delete body is
//! comma-separated date expressions.
//!
//! Parsing is all-or-nothing: one malformed entry fails the whole command.

use std::collections::BTreeSet;

use jiff::civil::Date;

use crate::model::{Command, DeleteRequest, LogEntry};

use super::{ParseError, date, duration};

/// The mention that addresses the bot in a comment.
pub const MENTION: &str = "@tally";

/// Parse a comment into a command, resolving relative dates against `today`.
pub fn parse(comment: &str, today: Date) -> Result<Command, ParseError> {
    let text = comment.trim();
    let rest = text
        .strip_prefix(MENTION)
        .ok_or(ParseError::UnrecognizedCommand)?;

    // The mention must be a whole word: `@tallyho` is not a command.
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return Err(ParseError::UnrecognizedCommand);
    }

    let rest = rest.trim_start();
    let (keyword, body) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));

    match keyword {
        "log" => parse_log_body(body.trim(), today),
        "delete" => parse_delete_body(body.trim(), today),
        "show" => Ok(Command::Show),
        _ => Err(ParseError::UnrecognizedCommand),
    }
}

/// Parse a comment as a log command, or `None` if it isn't one.
///
/// This is the aggregator's view of a comment: anything that fails to parse
/// is noise to skip, never an error.
pub fn try_log_entries(comment: &str, today: Date) -> Option<Vec<LogEntry>> {
    match parse(comment, today) {
        Ok(Command::Log(entries)) => Some(entries),
        _ => None,
    }
}

fn parse_log_body(body: &str, today: Date) -> Result<Command, ParseError> {
    if body.is_empty() {
        return Err(ParseError::EmptyCommandBody);
    }

    let mut entries = Vec::new();
    for segment in split_entries(body) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        entries.push(parse_entry(segment, today)?);
    }

    if entries.is_empty() {
        return Err(ParseError::EmptyCommandBody);
    }
    Ok(Command::Log(entries))
}

fn parse_delete_body(body: &str, today: Date) -> Result<Command, ParseError> {
    if body.is_empty() {
        return Err(ParseError::EmptyCommandBody);
    }

    let mut dates = BTreeSet::new();
    for segment in split_entries(body) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        dates.insert(date::resolve(segment, today)?);
    }

    if dates.is_empty() {
        return Err(ParseError::EmptyCommandBody);
    }
    Ok(Command::Delete(DeleteRequest { dates }))
}

/// Split a command body on commas, except inside double quotes.
fn split_entries(body: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in body.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ',' if !in_quotes => segments.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Parse one `<date> <duration> ["description"]` entry.
fn parse_entry(raw: &str, today: Date) -> Result<LogEntry, ParseError> {
    // Pull the quoted description out before tokenizing, so a description
    // word containing 'h' or 'm' can't be mistaken for the duration.
    let (text, quoted) = split_description(raw);

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let Some(idx) = tokens.iter().position(|t| is_duration_token(t)) else {
        return Err(ParseError::InvalidEntryFormat(raw.to_string()));
    };

    // Everything before the duration is the (possibly multi-word) date.
    let date = date::resolve(&tokens[..idx].join(" "), today)?;
    let hours = duration::parse(tokens[idx])?;

    let description = match quoted {
        Some(q) => Some(q),
        None if idx + 1 < tokens.len() => Some(tokens[idx + 1..].join(" ")),
        None => None,
    };

    Ok(LogEntry {
        date,
        hours,
        description,
    })
}

/// Extract the quoted description span, returning the remaining text and
/// the description (if any). An unmatched quote is left in place.
fn split_description(raw: &str) -> (String, Option<String>) {
    if let (Some(start), Some(end)) = (raw.find('"'), raw.rfind('"'))
        && end > start
    {
        let inner = raw[start + 1..end].trim();
        let mut text = String::from(&raw[..start]);
        text.push(' ');
        text.push_str(&raw[end + 1..]);
        let description = (!inner.is_empty()).then(|| inner.to_string());
        return (text, description);
    }
    (raw.to_string(), None)
}

/// A duration token starts with a digit and mentions hours or minutes.
///
/// The digit requirement is what lets weekday and month words through:
/// `monday` and `march` contain 'm'/'h' but are date material, not durations.
fn is_duration_token(token: &str) -> bool {
    token.starts_with(|c: char| c.is_ascii_digit())
        && (token.contains('h') || token.contains('m'))
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    // 2024-02-19 was a Monday.
    fn monday() -> Date {
        date(2024, 2, 19)
    }

    fn entries(command: Command) -> Vec<LogEntry> {
        match command {
            Command::Log(entries) => entries,
            other => panic!("expected log command, got {other:?}"),
        }
    }

    #[test]
    fn log_single_entry() {
        let cmd = parse("@tally log today 3h", monday()).unwrap();
        let entries = entries(cmd);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].date, date(2024, 2, 19));
        assert_eq!(entries[0].hours, 3.0);
        assert_eq!(entries[0].description, None);
    }

    #[test]
    fn log_multiple_entries_with_multiword_dates() {
        let cmd = parse(
            "@tally log last monday 4h, feb 15 5h \"code review\"",
            monday(),
        )
        .unwrap();
        let entries = entries(cmd);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, date(2024, 2, 12));
        assert_eq!(entries[0].hours, 4.0);
        assert_eq!(entries[1].date, date(2024, 2, 15));
        assert_eq!(entries[1].description.as_deref(), Some("code review"));
    }

    #[test]
    fn quoted_descriptions_may_contain_commas() {
        let cmd = parse("@tally log today 3h \"a, b\", yesterday 2h", monday()).unwrap();
        let entries = entries(cmd);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].description.as_deref(), Some("a, b"));
        assert_eq!(entries[1].date, date(2024, 2, 18));
        assert_eq!(entries[1].description, None);
    }

    #[test]
    fn quoted_description_words_are_not_durations() {
        // "marathon" contains both 'm' and 'h' but sits inside quotes.
        let cmd = parse("@tally log today 2h \"marathon debugging\"", monday()).unwrap();
        let entries = entries(cmd);
        assert_eq!(entries[0].hours, 2.0);
        assert_eq!(entries[0].description.as_deref(), Some("marathon debugging"));
    }

    #[test]
    fn unquoted_trailing_description() {
        let cmd = parse("@tally log today 2h fixed math", monday()).unwrap();
        let entries = entries(cmd);
        assert_eq!(entries[0].hours, 2.0);
        assert_eq!(entries[0].description.as_deref(), Some("fixed math"));
    }

    #[test]
    fn zero_hours_survive_parsing() {
        // 0h signals deletion downstream; the parser must keep it.
        let cmd = parse("@tally log yesterday 0h", monday()).unwrap();
        let entries = entries(cmd);
        assert_eq!(entries[0].hours, 0.0);
    }

    #[test]
    fn combined_duration_in_an_entry() {
        let cmd = parse("@tally log today 2h30m", monday()).unwrap();
        assert_eq!(entries(cmd)[0].hours, 2.5);
    }

    #[test]
    fn one_bad_segment_fails_the_whole_command() {
        let err = parse("@tally log today 3h, someday 2h", monday()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidDateFormat(_)));
    }

    #[test]
    fn entry_without_duration_fails() {
        let err = parse("@tally log today", monday()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidEntryFormat(_)));
    }

    #[test]
    fn delete_resolves_each_date() {
        let cmd = parse("@tally delete yesterday, 2024-02-15", monday()).unwrap();
        let Command::Delete(request) = cmd else {
            panic!("expected delete");
        };
        assert!(request.dates.contains(&date(2024, 2, 18)));
        assert!(request.dates.contains(&date(2024, 2, 15)));
        assert_eq!(request.dates.len(), 2);
    }

    #[test]
    fn show_takes_no_body() {
        assert_eq!(parse("@tally show", monday()).unwrap(), Command::Show);
    }

    #[test]
    fn empty_bodies_are_rejected() {
        assert_eq!(
            parse("@tally log", monday()).unwrap_err(),
            ParseError::EmptyCommandBody
        );
        assert_eq!(
            parse("@tally delete  ", monday()).unwrap_err(),
            ParseError::EmptyCommandBody
        );
        assert_eq!(
            parse("@tally log , ,", monday()).unwrap_err(),
            ParseError::EmptyCommandBody
        );
    }

    #[test]
    fn unknown_keywords_and_plain_text_are_unrecognized() {
        for text in [
            "@tally frobnicate now",
            "@tally",
            "@tallyho log today 3h",
            "just a regular comment",
        ] {
            assert_eq!(
                parse(text, monday()).unwrap_err(),
                ParseError::UnrecognizedCommand,
                "for {text:?}"
            );
        }
    }

    #[test]
    fn try_log_entries_is_silent_on_noise() {
        assert!(try_log_entries("LGTM, shipping it", monday()).is_none());
        assert!(try_log_entries("@tally delete today", monday()).is_none());
        assert!(try_log_entries("@tally log today 3h", monday()).is_some());
    }
}
