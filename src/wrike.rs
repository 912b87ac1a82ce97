//! Wrike collaborator: the remote ledger's CRUD surface.
//!
//! A task's timelogs are the ledger entries this bot reconciles. Calls are
//! plain blocking HTTP with a bearer token; every mutation is a single
//! request, and the caller decides what a partial failure means.

use std::time::Duration;

use jiff::civil::Date;
use serde::Deserialize;
use tracing::debug;

use crate::model::LedgerEntry;

const BASE_URL: &str = "https://app-eu.wrike.com/api/v4";
const TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from talking to the Wrike API.
#[derive(Debug, thiserror::Error)]
pub enum WrikeError {
    #[error("wrike API call failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("wrike returned no task in its response")]
    EmptyTaskResponse,
}

pub type Result<T> = std::result::Result<T, WrikeError>;

/// A Wrike task: the container for one issue's ledger entries.
#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
}

/// A client bound to one user's API token.
pub struct Wrike {
    agent: ureq::Agent,
    token: String,
}

/// Wrike wraps every response body in `{"data": [...]}`.
#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: Vec<T>,
}

/// Wire shape of one timelog record.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTimelog {
    id: String,
    tracked_date: Date,
    hours: f64,
    #[serde(default)]
    comment: String,
}

impl Wrike {
    pub fn new(token: impl Into<String>) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(TIMEOUT))
            .build()
            .new_agent();
        Self {
            agent,
            token: token.into(),
        }
    }

    /// List a task's timelogs as ledger entries.
    pub fn timelogs(&self, task_id: &str) -> Result<Vec<LedgerEntry>> {
        let url = format!("{BASE_URL}/tasks/{task_id}/timelogs");
        let envelope: DataEnvelope<WireTimelog> = self
            .agent
            .get(&url)
            .header("Authorization", &self.bearer())
            .call()?
            .body_mut()
            .read_json()?;

        debug!(task = task_id, count = envelope.data.len(), "fetched timelogs");
        Ok(envelope
            .data
            .into_iter()
            .map(|t| LedgerEntry {
                id: t.id,
                date: t.tracked_date,
                hours: t.hours,
                comment: t.comment,
            })
            .collect())
    }

    /// Create a timelog for a specific date.
    pub fn add_timelog(&self, task_id: &str, date: Date, hours: f64, comment: &str) -> Result<()> {
        let url = format!("{BASE_URL}/tasks/{task_id}/timelogs");
        let payload = serde_json::json!({
            "hours": hours,
            "trackedDate": date.to_string(),
            "comment": comment,
        });
        self.post(&url, &payload)
    }

    /// Change an existing timelog's hours.
    pub fn update_timelog(&self, timelog_id: &str, hours: f64) -> Result<()> {
        let url = format!("{BASE_URL}/timelogs/{timelog_id}");
        let payload = serde_json::json!({ "hours": hours });
        self.agent
            .put(&url)
            .header("Authorization", &self.bearer())
            .header("Content-Type", "application/json")
            .send(payload.to_string())?;
        Ok(())
    }

    /// Remove a timelog.
    pub fn delete_timelog(&self, timelog_id: &str) -> Result<()> {
        let url = format!("{BASE_URL}/timelogs/{timelog_id}");
        self.agent
            .delete(&url)
            .header("Authorization", &self.bearer())
            .call()?;
        Ok(())
    }

    /// Create a task in a folder, returning the new task.
    pub fn create_task(&self, folder_id: &str, title: &str, description: &str) -> Result<Task> {
        let url = format!("{BASE_URL}/folders/{folder_id}/tasks");
        let payload = serde_json::json!({
            "title": title,
            "description": description,
        });
        let envelope: DataEnvelope<Task> = self
            .agent
            .post(&url)
            .header("Authorization", &self.bearer())
            .header("Content-Type", "application/json")
            .send(payload.to_string())?
            .body_mut()
            .read_json()?;

        envelope
            .data
            .into_iter()
            .next()
            .ok_or(WrikeError::EmptyTaskResponse)
    }

    fn post(&self, url: &str, payload: &serde_json::Value) -> Result<()> {
        self.agent
            .post(url)
            .header("Authorization", &self.bearer())
            .header("Content-Type", "application/json")
            .send(payload.to_string())?;
        Ok(())
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}
