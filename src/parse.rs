//! Parsing for the bot command language.
//!
//! A command is an issue comment addressed to the bot:
//!
//! ```text
//! @tally log today 3h "feature work", last monday 2h30m
//! @tally delete yesterday, 2024-02-15
//! @tally show
//! ```
//!
//! Submodules split along the grammar: [`date`] resolves date expressions,
//! [`duration`] converts duration expressions to fractional hours, and
//! [`command`] assembles whole commands from comment text.
//!
//! All failures are local, non-retryable parse errors; the caller surfaces
//! them to the end user with a help message and aborts the action.

pub mod command;
pub mod date;
pub mod duration;

/// Errors produced while parsing a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unrecognized date format: '{0}'")]
    InvalidDateFormat(String),

    #[error("invalid duration '{0}': must be like 3h, 30m, or 2h30m")]
    InvalidDurationFormat(String),

    #[error("invalid entry '{0}': expected <date> <duration> [\"description\"]")]
    InvalidEntryFormat(String),

    #[error("command not recognized")]
    UnrecognizedCommand,

    #[error("command requires a body")]
    EmptyCommandBody,
}
