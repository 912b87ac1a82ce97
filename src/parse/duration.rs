//! Duration expression parsing.
//!
//! Three forms, nothing else: `2h30m` (combined, whole numbers), `3h` or
//! `4.5h` (hours, fractions allowed), `30m` (minutes, converted by real
//! division — fractional minutes are never truncated).

use super::ParseError;

/// Parse a duration expression into fractional hours.
///
/// The result is always finite and non-negative; a negative duration is
/// rejected rather than logged.
pub fn parse(expr: &str) -> Result<f64, ParseError> {
    let normalized = expr.trim().to_lowercase();
    let s = normalized.as_str();
    let invalid = || ParseError::InvalidDurationFormat(expr.trim().to_string());

    let hours = if let Some(rest) = s.strip_suffix('m') {
        if let Some((h, m)) = rest.split_once('h') {
            // Combined `<int>h<int>m`.
            let whole_hours: u32 = h.parse().map_err(|_| invalid())?;
            let minutes: u32 = m.parse().map_err(|_| invalid())?;
            f64::from(whole_hours) + f64::from(minutes) / 60.0
        } else {
            // Minutes only.
            let minutes: f64 = rest.parse().map_err(|_| invalid())?;
            minutes / 60.0
        }
    } else if let Some(rest) = s.strip_suffix('h') {
        rest.parse().map_err(|_| invalid())?
    } else {
        return Err(invalid());
    };

    if !hours.is_finite() || hours < 0.0 {
        return Err(invalid());
    }
    Ok(hours)
}
