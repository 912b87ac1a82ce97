//! CLI interface for tally.
//!
//! The binary has two jobs: `run`, the entry point the issue-comment
//! workflow invokes with everything in environment variables, and `parse`,
//! an offline check that a command string means what you think it means.

use clap::{Parser, Subcommand};
use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::bot;
use crate::config::Config;
use crate::parse::command;
use crate::render;

/// tally — keep a Wrike hours ledger in sync with issue comments.
#[derive(Debug, Parser)]
#[command(name = "tally")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Handle the triggering issue comment, read from the environment.
    ///
    /// Expects GITHUB_REPO, GITHUB_USERNAME, GITHUB_ISSUE_NUMBER,
    /// GITHUB_COMMENT_BODY, and USERS; optionally WRIKE_FOLDER_ID.
    Run {
        /// Compute and log the plan without writing to GitHub or Wrike.
        #[arg(long)]
        dry_run: bool,
    },

    /// Parse a command string and print the result.
    Parse {
        /// The comment text, e.g. '@tally log today 3h'.
        text: String,
    },
}

/// Run the CLI, returning an error message on failure.
pub fn run() -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run { dry_run } => {
            let config = Config::from_env().map_err(|e| e.to_string())?;
            bot::run(&config, Timestamp::now(), dry_run).map_err(|e| e.to_string())
        }
        Command::Parse { text } => {
            let today = Timestamp::now().to_zoned(TimeZone::UTC).date();
            match command::parse(&text, today) {
                Ok(parsed) => {
                    println!("{parsed:#?}");
                    Ok(())
                }
                Err(error) => Err(format!("{error}\n\n{}", render::HELP)),
            }
        }
    }
}
