//! Orchestration: handle one triggering issue comment end to end.
//!
//! The flow is parse → route → scan → reconcile → apply → report. The core
//! stays pure; this module is where its inputs are fetched and its outputs
//! are turned into remote calls and summary comments.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use jiff::Timestamp;
use jiff::civil::Date;
use jiff::tz::TimeZone;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::github::{GitHub, GitHubError, Issue};
use crate::model::{
    Command, CommentRecord, IssueRelationship, LogEntry, ReconciliationPlan, RelationKind,
};
use crate::parse::{ParseError, command};
use crate::reconcile::reconcile;
use crate::relation;
use crate::render;
use crate::roster::{self, RosterError};
use crate::scan;
use crate::wrike::{Wrike, WrikeError};

/// Errors that abort handling a comment.
///
/// Parse failures are not among them: those are answered with a help
/// comment and count as handled.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    Wrike(#[from] WrikeError),

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("no Wrike task is linked and WRIKE_FOLDER_ID is not set, so none can be created")]
    NoTaskAndNoFolder,
}

pub type Result<T> = std::result::Result<T, BotError>;

/// Handle the triggering comment described by `config`.
///
/// `now` is injected rather than read ambiently so runs are reproducible.
/// With `dry_run` set, nothing is written to GitHub or Wrike; planned
/// operations are logged instead.
pub fn run(config: &Config, now: Timestamp, dry_run: bool) -> Result<()> {
    let github = GitHub::new(&config.repo);
    let today = now.to_zoned(TimeZone::UTC).date();

    let parsed = match command::parse(&config.comment_body, today) {
        Ok(parsed) => parsed,
        Err(ParseError::UnrecognizedCommand)
            if !config.comment_body.contains(command::MENTION) =>
        {
            // Not addressed to the bot; stay quiet.
            debug!("comment does not mention the bot");
            return Ok(());
        }
        Err(error) => {
            warn!(%error, "rejecting malformed command");
            if !dry_run {
                github.post_comment(config.issue_number, &render::parse_failure(&error))?;
            }
            return Ok(());
        }
    };

    let user = roster::resolve(&config.users, &config.username)?;
    debug!(user = %user.wrike_email, "resolved roster user");
    let wrike = Wrike::new(&user.wrike_token);

    let issue = github.issue(config.issue_number)?;
    let candidates = github.search_referencing(issue.number)?;
    let relationship = relation::classify(issue.number, &issue.body, &candidates);
    info!(issue = issue.number, kind = ?relationship.kind, "classified issue");

    let bot = Bot {
        config,
        github: &github,
        wrike: &wrike,
        now,
        dry_run,
    };

    match parsed {
        Command::Show => bot.show(&issue, &relationship),
        Command::Log(entries) => bot.log(&issue, &relationship, &entries),
        Command::Delete(request) => bot.delete(&issue, &relationship, &request.dates),
    }
}

/// The set of issues whose histories feed one sync, and the issue whose
/// ledger task receives the result.
struct SyncScope {
    target_issue: Issue,
    histories: BTreeMap<u64, Vec<CommentRecord>>,
}

struct Bot<'a> {
    config: &'a Config,
    github: &'a GitHub,
    wrike: &'a Wrike,
    now: Timestamp,
    dry_run: bool,
}

impl Bot<'_> {
    // ── Command handlers ──

    fn log(
        &self,
        issue: &Issue,
        relationship: &IssueRelationship,
        entries: &[LogEntry],
    ) -> Result<()> {
        if relationship.kind == RelationKind::Parent {
            info!("rejecting log on a parent issue");
            return self.post(issue.number, &render::parent_rejection(&relationship.children));
        }

        let mut scope = self.sync_scope(issue, relationship)?;

        // Fold the triggering comment into the submitting issue's history
        // rather than trusting the fetch to already include it. Latest-wins
        // aggregation makes the duplicate harmless.
        scope
            .histories
            .entry(issue.number)
            .or_default()
            .push(CommentRecord {
                body: self.config.comment_body.clone(),
                created_at: self.now,
            });

        let target_dates: BTreeSet<Date> = entries.iter().map(|e| e.date).collect();
        let mut target = scan::aggregate(&scope.histories, &target_dates);
        apply_zero_removals(&mut target, entries);

        let Some(task_id) = self.ledger_task(&scope.target_issue)? else {
            return Ok(()); // dry run without a linked task
        };

        let existing: Vec<_> = self
            .wrike
            .timelogs(&task_id)?
            .into_iter()
            .filter(|e| target_dates.contains(&e.date))
            .collect();

        let plan = reconcile(&target, &existing);
        if plan.is_noop() {
            info!("ledger already matches the computed hours");
        }
        let notes: BTreeMap<Date, String> = entries
            .iter()
            .filter_map(|e| e.description.clone().map(|d| (e.date, d)))
            .collect();
        self.apply(&task_id, &plan, &notes);

        self.post(
            issue.number,
            &render::change_summary(&target, &existing, &plan),
        )
    }

    fn delete(
        &self,
        issue: &Issue,
        relationship: &IssueRelationship,
        dates: &BTreeSet<Date>,
    ) -> Result<()> {
        if relationship.kind == RelationKind::Parent {
            info!("rejecting delete on a parent issue");
            return self.post(issue.number, &render::parent_rejection(&relationship.children));
        }

        // No history scan needed: deletion only needs the target's task.
        let target_issue = match relationship.parent {
            Some(parent_number) => self.github.issue(parent_number)?,
            None => issue.clone(),
        };
        let Some(task_id) = linked_task_id(&target_issue.body) else {
            info!("no ledger task linked; nothing to delete");
            return Ok(());
        };

        // Deleting converges the requested dates to "absent": reconcile
        // against an empty target, scoped to just those dates.
        let existing: Vec<_> = self
            .wrike
            .timelogs(&task_id)?
            .into_iter()
            .filter(|e| dates.contains(&e.date))
            .collect();
        for entry in &existing {
            debug!(date = %entry.date, note = %entry.comment, "ledger entry scheduled for removal");
        }

        let target = BTreeMap::new();
        let plan = reconcile(&target, &existing);
        self.apply(&task_id, &plan, &BTreeMap::new());

        self.post(
            issue.number,
            &render::change_summary(&target, &existing, &plan),
        )
    }

    fn show(&self, issue: &Issue, relationship: &IssueRelationship) -> Result<()> {
        let histories = match relationship.kind {
            // A parent shows the roll-up of its children.
            RelationKind::Parent => self.child_histories(&relationship.children),
            // Children and standalone issues show their own contribution.
            _ => BTreeMap::from([(issue.number, self.github.comments(issue.number)?)]),
        };

        let dates = scan::mentioned_dates(&histories);
        let mut hours = scan::aggregate(&histories, &dates);
        // Explicitly zeroed dates are deletions, not state worth showing.
        hours.retain(|_, h| *h > 0.0);

        self.post(issue.number, &render::hours_table(&hours))
    }

    // ── Scope resolution ──

    /// Work out whose histories to scan and whose ledger task to sync.
    ///
    /// A child syncs its parent's task from all of the parent's children;
    /// a standalone issue syncs its own task from its own history.
    fn sync_scope(&self, issue: &Issue, relationship: &IssueRelationship) -> Result<SyncScope> {
        match relationship.parent {
            Some(parent_number) => {
                let parent = self.github.issue(parent_number)?;
                let candidates = self.github.search_referencing(parent_number)?;
                let mut children =
                    relation::classify(parent_number, &parent.body, &candidates).children;
                // The submitting child declares the parent, but the search
                // index may lag; make sure it's in scope regardless.
                if !children.contains(&issue.number) {
                    children.push(issue.number);
                }
                Ok(SyncScope {
                    target_issue: parent,
                    histories: self.child_histories(&children),
                })
            }
            None => Ok(SyncScope {
                target_issue: issue.clone(),
                histories: BTreeMap::from([(issue.number, self.github.comments(issue.number)?)]),
            }),
        }
    }

    /// Fetch each child's comments; a child that fails to fetch is skipped
    /// with a warning so one bad fetch can't block the sync.
    fn child_histories(&self, children: &[u64]) -> BTreeMap<u64, Vec<CommentRecord>> {
        let mut histories = BTreeMap::new();
        for &child in children {
            match self.github.comments(child) {
                Ok(comments) => {
                    histories.insert(child, comments);
                }
                Err(error) => warn!(child, %error, "skipping child issue"),
            }
        }
        histories
    }

    // ── Ledger task provisioning ──

    /// The target issue's Wrike task id, creating and linking a task when
    /// the issue has none.
    ///
    /// Returns `None` only in a dry run where a task would have been
    /// created.
    fn ledger_task(&self, issue: &Issue) -> Result<Option<String>> {
        if let Some(id) = linked_task_id(&issue.body) {
            return Ok(Some(id));
        }

        let Some(folder_id) = &self.config.wrike_folder_id else {
            return Err(BotError::NoTaskAndNoFolder);
        };

        if self.dry_run {
            info!(issue = issue.number, "dry run: would create a Wrike task");
            return Ok(None);
        }

        let description = format!("Synced from {}#{}", self.config.repo, issue.number);
        let task = self.wrike.create_task(folder_id, &issue.title, &description)?;
        info!(task = %task.id, title = %task.title, "created Wrike task");

        let new_body = format!("Wrike Task ID: {}\n\n{}", task.id, issue.body);
        self.github.set_issue_body(issue.number, &new_body)?;
        Ok(Some(task.id))
    }

    // ── Applying a plan ──

    /// Apply the plan against the remote ledger. Each failed operation is
    /// logged and the rest continue; there is no rollback.
    fn apply(&self, task_id: &str, plan: &ReconciliationPlan, notes: &BTreeMap<Date, String>) {
        if self.dry_run {
            info!(?plan, "dry run: not applying");
            return;
        }

        for &(date, hours) in &plan.to_add {
            let note = notes
                .get(&date)
                .map_or_else(|| format!("Logged via tally by {}", self.config.username), Clone::clone);
            if let Err(error) = self.wrike.add_timelog(task_id, date, hours, &note) {
                warn!(%date, %error, "failed to add ledger entry");
            }
        }
        for update in &plan.to_update {
            if let Err(error) = self.wrike.update_timelog(&update.id, update.new_hours) {
                warn!(id = %update.id, %error, "failed to update ledger entry");
            }
        }
        for id in &plan.to_delete {
            if let Err(error) = self.wrike.delete_timelog(id) {
                warn!(%id, %error, "failed to delete ledger entry");
            }
        }
    }

    fn post(&self, issue_number: u64, body: &str) -> Result<()> {
        if self.dry_run {
            info!(issue = issue_number, %body, "dry run: would post comment");
            return Ok(());
        }
        self.github.post_comment(issue_number, body)?;
        Ok(())
    }
}

static TASK_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)wrike\s*task\s*id:\s*([A-Za-z0-9_-]+)").unwrap());

/// The Wrike task id linked in an issue body, if any.
fn linked_task_id(body: &str) -> Option<String> {
    TASK_ID_PATTERN
        .captures(body)
        .map(|captures| captures[1].to_string())
}

/// Drop a date from the target map when the current command explicitly
/// zeroed it and the whole aggregate agrees.
///
/// The scan keeps zeroed dates so their history stays visible; it is this
/// command-level step that turns "everyone says 0h" into "no ledger entry
/// at all" — and only for dates the submitter just set to zero.
#[allow(clippy::float_cmp)]
fn apply_zero_removals(target: &mut BTreeMap<Date, f64>, entries: &[LogEntry]) {
    for entry in entries {
        if entry.hours == 0.0 && target.get(&entry.date) == Some(&0.0) {
            target.remove(&entry.date);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    #[test]
    fn linked_task_id_finds_the_marker() {
        let body = "Some intro.\n\nWrike Task ID: IEAAB123\n\nDetails follow.";
        assert_eq!(linked_task_id(body).as_deref(), Some("IEAAB123"));
        assert_eq!(linked_task_id("wrike task id: abc-DEF_9").as_deref(), Some("abc-DEF_9"));
        assert_eq!(linked_task_id("No marker here."), None);
    }

    #[test]
    fn zero_removal_only_hits_zeroed_aggregates() {
        let mut target = BTreeMap::from([
            (date(2024, 2, 15), 0.0),
            (date(2024, 2, 16), 2.0),
            (date(2024, 2, 17), 0.0),
        ]);
        let entries = vec![
            LogEntry {
                date: date(2024, 2, 15),
                hours: 0.0,
                description: None,
            },
            LogEntry {
                date: date(2024, 2, 16),
                hours: 0.0,
                description: None,
            },
        ];

        apply_zero_removals(&mut target, &entries);

        // Feb 15: submitted 0h, aggregate 0 → removed. Feb 16: submitted 0h
        // but siblings still contribute 2h → stays. Feb 17: aggregate 0 but
        // not part of this command → stays.
        assert!(!target.contains_key(&date(2024, 2, 15)));
        assert_eq!(target.get(&date(2024, 2, 16)), Some(&2.0));
        assert_eq!(target.get(&date(2024, 2, 17)), Some(&0.0));
    }
}
