//! GitHub collaborator: fetch issues and comments, search for related
//! issues, post comments, edit bodies.
//!
//! Everything goes through the `gh` CLI, which owns authentication
//! (`GH_TOKEN` in the action environment). Reads use `gh issue view --json`
//! and `gh api`; writes use the plain subcommands.

use std::process::Command;

use jiff::Timestamp;
use serde::Deserialize;
use tracing::debug;

use crate::model::{CommentRecord, IssueRef};

/// Errors from driving the `gh` CLI.
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error("failed to run gh: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("gh {args} failed: {stderr}")]
    Failed { args: String, stderr: String },

    #[error("unexpected gh output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bad comment timestamp: {0}")]
    Timestamp(#[from] jiff::Error),
}

pub type Result<T> = std::result::Result<T, GitHubError>;

/// An issue's metadata, as much of it as the bot needs.
#[derive(Debug, Clone)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub body: String,
}

/// A client scoped to one `owner/name` repository.
pub struct GitHub {
    repo: String,
}

/// JSON shape returned by `gh issue view --json number,title,body`.
#[derive(Deserialize)]
struct GhIssueView {
    number: u64,
    title: String,
    #[serde(default)]
    body: String,
}

/// JSON shape for `gh issue view --json comments`.
#[derive(Deserialize)]
struct GhComments {
    comments: Vec<GhComment>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhComment {
    body: String,
    created_at: String,
}

/// JSON shape for `gh api search/issues`.
#[derive(Deserialize)]
struct GhSearchResult {
    items: Vec<GhSearchItem>,
}

#[derive(Deserialize)]
struct GhSearchItem {
    number: u64,
    #[serde(default)]
    body: Option<String>,
}

impl GitHub {
    pub fn new(repo: impl Into<String>) -> Self {
        Self { repo: repo.into() }
    }

    /// Fetch an issue's number, title, and body.
    pub fn issue(&self, number: u64) -> Result<Issue> {
        let num = number.to_string();
        let json = self.gh(&[
            "issue",
            "view",
            &num,
            "-R",
            &self.repo,
            "--json",
            "number,title,body",
        ])?;
        let issue: GhIssueView = serde_json::from_str(&json)?;
        Ok(Issue {
            number: issue.number,
            title: issue.title,
            body: issue.body,
        })
    }

    /// Fetch an issue's comments, oldest first.
    pub fn comments(&self, number: u64) -> Result<Vec<CommentRecord>> {
        let num = number.to_string();
        let json = self.gh(&[
            "issue",
            "view",
            &num,
            "-R",
            &self.repo,
            "--json",
            "comments",
        ])?;
        let wrapper: GhComments = serde_json::from_str(&json)?;

        let mut comments = Vec::with_capacity(wrapper.comments.len());
        for c in wrapper.comments {
            comments.push(CommentRecord {
                body: c.body,
                created_at: c.created_at.parse::<Timestamp>()?,
            });
        }
        debug!(issue = number, count = comments.len(), "fetched comments");
        Ok(comments)
    }

    /// Search the repository for issues whose bodies mention `#number`.
    ///
    /// This is deliberately broad; the relationship resolver filters the
    /// candidates down to actual child declarations.
    pub fn search_referencing(&self, number: u64) -> Result<Vec<IssueRef>> {
        let query = format!("repo:{} \"#{number}\" in:body is:issue", self.repo);
        let json = self.gh(&[
            "api",
            "-X",
            "GET",
            "search/issues",
            "-f",
            &format!("q={query}"),
            "-f",
            "per_page=100",
        ])?;
        let result: GhSearchResult = serde_json::from_str(&json)?;

        Ok(result
            .items
            .into_iter()
            .map(|item| IssueRef {
                number: item.number,
                body: item.body.unwrap_or_default(),
            })
            .collect())
    }

    /// Post a comment on an issue.
    pub fn post_comment(&self, number: u64, body: &str) -> Result<()> {
        let num = number.to_string();
        self.gh(&[
            "issue", "comment", &num, "-R", &self.repo, "--body", body,
        ])?;
        debug!(issue = number, "posted comment");
        Ok(())
    }

    /// Replace an issue's body.
    pub fn set_issue_body(&self, number: u64, body: &str) -> Result<()> {
        let num = number.to_string();
        self.gh(&["issue", "edit", &num, "-R", &self.repo, "--body", body])?;
        Ok(())
    }

    /// Run `gh` with the given args and return stdout on success.
    fn gh(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("gh").args(args).output()?;

        if !output.status.success() {
            return Err(GitHubError::Failed {
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
