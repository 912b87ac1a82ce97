//! Date expression resolution.
//!
//! Converts a date expression — relative (`today`, `last monday`) or absolute
//! (`2024-02-15`, `feb 15`, `15`) — into a calendar date, given the date that
//! counts as "today". The reference date is always a parameter: nothing here
//! reads ambient time, so resolution is deterministic and testable.
//!
//! Forms are tried in a fixed precedence order; the first match wins:
//!
//! 1. `today`
//! 2. `yesterday`
//! 3. `last <weekday>` — strictly within the previous 7 days, so
//!    `last monday` said on a Monday means 7 days ago
//! 4. bare weekday name — most recent occurrence, where today counts
//!    (`monday` said on a Monday means today; asymmetric with form 3)
//! 5. `YYYY-MM-DD`
//! 6. `<month> <day>` or `<day> <month>` — current year
//! 7. bare 1–2 digit day — current year and month
//! 8. `MM-DD` — current year

use jiff::Span;
use jiff::civil::{Date, Weekday};

use super::ParseError;

/// Resolve a date expression against a reference date.
///
/// Matching is case-insensitive and whitespace-trimmed. Expressions that
/// name an impossible calendar date (`2024-02-30`, `feb 31`) are rejected.
pub fn resolve(expr: &str, today: Date) -> Result<Date, ParseError> {
    let normalized = expr.trim().to_lowercase();
    let s = normalized.as_str();
    let invalid = || ParseError::InvalidDateFormat(expr.trim().to_string());

    if s == "today" {
        return Ok(today);
    }

    if s == "yesterday" {
        return back(today, 1).ok_or_else(invalid);
    }

    // `last <weekday>`: the occurrence strictly before today, so a zero
    // offset becomes a full week.
    if let Some(rest) = s.strip_prefix("last ") {
        let weekday = weekday_from_name(rest.trim()).ok_or_else(invalid)?;
        let mut days = days_since(today, weekday);
        if days == 0 {
            days = 7;
        }
        return back(today, days).ok_or_else(invalid);
    }

    // Bare weekday: most recent occurrence, today included.
    if let Some(weekday) = weekday_from_name(s) {
        return back(today, days_since(today, weekday)).ok_or_else(invalid);
    }

    // Full ISO date.
    if is_iso_shape(s) {
        return s.parse().map_err(|_| invalid());
    }

    // Textual month-day: `feb 15`, `15 feb`, `march 20`, `20 march`.
    if let Some((month, day)) = month_day_from_text(s) {
        return Date::new(today.year(), month, day).map_err(|_| invalid());
    }

    // Bare day of the current month.
    if !s.is_empty() && s.len() <= 2 && s.bytes().all(|b| b.is_ascii_digit()) {
        let day = s.parse().map_err(|_| invalid())?;
        return Date::new(today.year(), today.month(), day).map_err(|_| invalid());
    }

    // `MM-DD` in the current year.
    if is_month_day_shape(s) {
        let month = s[..2].parse().map_err(|_| invalid())?;
        let day = s[3..].parse().map_err(|_| invalid())?;
        return Date::new(today.year(), month, day).map_err(|_| invalid());
    }

    Err(invalid())
}

/// Days from the most recent occurrence of `weekday` up to `today`.
///
/// 0 when today is that weekday; the "last week or this week" wrap is what
/// makes a future-sounding weekday name point backwards.
fn days_since(today: Date, weekday: Weekday) -> i64 {
    let offset =
        i64::from(today.weekday().to_monday_zero_offset() - weekday.to_monday_zero_offset());
    offset.rem_euclid(7)
}

/// `today` minus `days`, or `None` at the edge of the calendar.
fn back(today: Date, days: i64) -> Option<Date> {
    today.checked_sub(Span::new().days(days)).ok()
}

/// `YYYY-MM-DD`.
fn is_iso_shape(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[..4].iter().all(u8::is_ascii_digit)
        && b[4] == b'-'
        && b[5..7].iter().all(u8::is_ascii_digit)
        && b[7] == b'-'
        && b[8..].iter().all(u8::is_ascii_digit)
}

/// `MM-DD`.
fn is_month_day_shape(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 5
        && b[..2].iter().all(u8::is_ascii_digit)
        && b[2] == b'-'
        && b[3..].iter().all(u8::is_ascii_digit)
}

/// Parse `<month> <day>` or `<day> <month>` into (month, day).
///
/// Returns `None` when the text is not two words with a recognizable month
/// name and a day in 1–31; calendar validity is checked by the caller.
fn month_day_from_text(s: &str) -> Option<(i8, i8)> {
    let mut words = s.split_whitespace();
    let (first, second) = (words.next()?, words.next()?);
    if words.next().is_some() {
        return None;
    }

    let day_of = |w: &str| w.parse::<i8>().ok().filter(|d| (1..=31).contains(d));

    if let Some(month) = month_from_name(first) {
        return day_of(second).map(|day| (month, day));
    }
    if let Some(month) = month_from_name(second) {
        return day_of(first).map(|day| (month, day));
    }
    None
}

/// Weekday name, full or 3-letter.
fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name {
        "monday" | "mon" => Some(Weekday::Monday),
        "tuesday" | "tue" => Some(Weekday::Tuesday),
        "wednesday" | "wed" => Some(Weekday::Wednesday),
        "thursday" | "thu" => Some(Weekday::Thursday),
        "friday" | "fri" => Some(Weekday::Friday),
        "saturday" | "sat" => Some(Weekday::Saturday),
        "sunday" | "sun" => Some(Weekday::Sunday),
        _ => None,
    }
}

/// Month name, full or 3-letter, to a 1-based month number.
fn month_from_name(name: &str) -> Option<i8> {
    match name {
        "january" | "jan" => Some(1),
        "february" | "feb" => Some(2),
        "march" | "mar" => Some(3),
        "april" | "apr" => Some(4),
        "may" => Some(5),
        "june" | "jun" => Some(6),
        "july" | "jul" => Some(7),
        "august" | "aug" => Some(8),
        "september" | "sep" => Some(9),
        "october" | "oct" => Some(10),
        "november" | "nov" => Some(11),
        "december" | "dec" => Some(12),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    // 2024-02-19 was a Monday.
    fn monday() -> Date {
        date(2024, 2, 19)
    }

    #[test]
    fn today_and_yesterday() {
        assert_eq!(resolve("today", monday()).unwrap(), date(2024, 2, 19));
        assert_eq!(resolve("yesterday", monday()).unwrap(), date(2024, 2, 18));
    }

    #[test]
    fn bare_weekday_counts_today() {
        // Asking for "monday" on a Monday resolves to today, not a week ago.
        assert_eq!(resolve("monday", monday()).unwrap(), date(2024, 2, 19));
        assert_eq!(resolve("mon", monday()).unwrap(), date(2024, 2, 19));
    }

    #[test]
    fn last_weekday_skips_today() {
        // "last monday" on a Monday is a full week back.
        assert_eq!(resolve("last monday", monday()).unwrap(), date(2024, 2, 12));
    }

    #[test]
    fn weekday_wraps_to_previous_week() {
        // Tuesday is "in the future" this week, so it resolves to last week.
        assert_eq!(resolve("tuesday", monday()).unwrap(), date(2024, 2, 13));
        assert_eq!(resolve("friday", monday()).unwrap(), date(2024, 2, 16));
        assert_eq!(resolve("last friday", monday()).unwrap(), date(2024, 2, 16));
    }

    #[test]
    fn iso_date() {
        assert_eq!(
            resolve("2023-12-25", monday()).unwrap(),
            date(2023, 12, 25)
        );
    }

    #[test]
    fn iso_date_must_be_a_real_date() {
        assert!(matches!(
            resolve("2024-02-30", monday()),
            Err(ParseError::InvalidDateFormat(_))
        ));
    }

    #[test]
    fn textual_month_day_both_orders() {
        assert_eq!(resolve("feb 15", monday()).unwrap(), date(2024, 2, 15));
        assert_eq!(resolve("15 feb", monday()).unwrap(), date(2024, 2, 15));
        assert_eq!(resolve("march 20", monday()).unwrap(), date(2024, 3, 20));
        assert_eq!(resolve("20 march", monday()).unwrap(), date(2024, 3, 20));
    }

    #[test]
    fn textual_month_day_out_of_range() {
        assert!(resolve("feb 31", monday()).is_err());
        assert!(resolve("feb 0", monday()).is_err());
    }

    #[test]
    fn bare_day_uses_current_month() {
        assert_eq!(resolve("15", monday()).unwrap(), date(2024, 2, 15));
        assert_eq!(resolve("5", monday()).unwrap(), date(2024, 2, 5));
    }

    #[test]
    fn month_day_digits_use_current_year() {
        assert_eq!(resolve("03-15", monday()).unwrap(), date(2024, 3, 15));
    }

    #[test]
    fn case_and_whitespace_are_forgiven() {
        assert_eq!(resolve(" Today ", monday()).unwrap(), date(2024, 2, 19));
        assert_eq!(resolve("Feb 15", monday()).unwrap(), date(2024, 2, 15));
        assert_eq!(resolve("LAST MONDAY", monday()).unwrap(), date(2024, 2, 12));
    }

    #[test]
    fn unrecognized_input_fails() {
        for bad in ["", "someday", "2024/02/15", "15th", "next monday"] {
            assert!(
                matches!(
                    resolve(bad, monday()),
                    Err(ParseError::InvalidDateFormat(_))
                ),
                "expected failure for {bad:?}"
            );
        }
    }

    #[test]
    fn resolution_is_deterministic() {
        let a = resolve("last wed", monday()).unwrap();
        let b = resolve("last wed", monday()).unwrap();
        assert_eq!(a, b);
    }
}
