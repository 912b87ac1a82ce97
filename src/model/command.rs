//! Command types: what a bot mention in an issue comment asks for.

use std::collections::BTreeSet;

use jiff::civil::Date;

/// A parsed command addressed to the bot.
///
/// Closed enum so dispatch is exhaustive: adding a command means adding a
/// variant here and handling it everywhere the compiler points.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Log hours: one entry per date.
    Log(Vec<LogEntry>),

    /// Remove the ledger entries for a set of dates.
    Delete(DeleteRequest),

    /// Post a summary of the currently logged hours.
    Show,
}

/// A single `<date> <duration> ["description"]` entry from a log command.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub date: Date,

    /// Fractional hours. Invariant: `hours >= 0`.
    ///
    /// Exactly `0.0` is a sentinel: "delete this date's contribution from
    /// this source", not "log zero time". It survives parsing so the
    /// downstream sync can act on it.
    pub hours: f64,

    pub description: Option<String>,
}

/// The dates named by a delete command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub dates: BTreeSet<Date>,
}
