//! Bot configuration.
//!
//! Read from the action environment: the workflow that triggers on issue
//! comments passes everything through environment variables. Nothing is
//! read from disk.

use std::env;

/// Errors from an incomplete or malformed environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing {0} environment variable")]
    Missing(&'static str),

    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Everything the bot needs to handle one triggering comment.
#[derive(Debug, Clone)]
pub struct Config {
    /// `owner/name` of the repository the comment lives in.
    pub repo: String,

    /// GitHub login of whoever posted the comment.
    pub username: String,

    /// The issue the comment was posted on.
    pub issue_number: u64,

    /// The triggering comment's full text.
    pub comment_body: String,

    /// Base64-encoded JSON roster of users and their Wrike credentials.
    pub users: String,

    /// Folder for provisioning new Wrike tasks. Optional: without it the
    /// bot can sync existing tasks but not create new ones.
    pub wrike_folder_id: Option<String>,
}

impl Config {
    /// Load the configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let issue_raw = require("GITHUB_ISSUE_NUMBER")?;
        let issue_number = issue_raw.parse().map_err(|_| ConfigError::Invalid {
            var: "GITHUB_ISSUE_NUMBER",
            expected: "a number",
            value: issue_raw.clone(),
        })?;

        Ok(Self {
            repo: require("GITHUB_REPO")?,
            username: require("GITHUB_USERNAME")?,
            issue_number,
            comment_body: require("GITHUB_COMMENT_BODY")?,
            users: require("USERS")?,
            wrike_folder_id: optional("WRIKE_FOLDER_ID"),
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}
