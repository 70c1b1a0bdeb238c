use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fields::{
    as_object, items_of, optional_timestamp, required_str, required_timestamp, required_u64,
    WORKFLOW_TIMESTAMP_FORMAT,
};
use crate::error::{CircleCiError, Result};

/// Status of a CircleCI workflow. Closed set; anything else is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Success,
    Running,
    OnHold,
    NotRun,
    Failed,
    Error,
    Failing,
    Canceled,
    Unauthorized,
}

impl WorkflowStatus {
    pub const ALL: [WorkflowStatus; 9] = [
        WorkflowStatus::Success,
        WorkflowStatus::Running,
        WorkflowStatus::OnHold,
        WorkflowStatus::NotRun,
        WorkflowStatus::Failed,
        WorkflowStatus::Error,
        WorkflowStatus::Failing,
        WorkflowStatus::Canceled,
        WorkflowStatus::Unauthorized,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStatus::Success => "success",
            WorkflowStatus::Running => "running",
            WorkflowStatus::OnHold => "on_hold",
            WorkflowStatus::NotRun => "not_run",
            WorkflowStatus::Failed => "failed",
            WorkflowStatus::Error => "error",
            WorkflowStatus::Failing => "failing",
            WorkflowStatus::Canceled => "canceled",
            WorkflowStatus::Unauthorized => "unauthorized",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStatus {
    type Err = CircleCiError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CircleCiError::InvalidStatus(s.to_string()))
    }
}

/// One execution lane of a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    pub pipeline_id: String,
    pub pipeline_number: u64,
    pub project_slug: String,
    pub status: WorkflowStatus,
    pub started_by: String,
    pub created_at: DateTime<Utc>,
    /// Unset while the workflow is still running
    pub stopped_at: Option<DateTime<Utc>>,
}

impl Workflow {
    /// Maps one workflow item.
    ///
    /// # Errors
    ///
    /// - `MissingField` for any absent required key
    /// - `InvalidStatus` if `status` is outside [`WorkflowStatus`]
    /// - `TimestampParse` if a timestamp does not match the workflow format
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = as_object(value, "workflow")?;
        Ok(Self {
            id: required_str(obj, "id")?,
            name: required_str(obj, "name")?,
            pipeline_id: required_str(obj, "pipeline_id")?,
            pipeline_number: required_u64(obj, "pipeline_number")?,
            project_slug: required_str(obj, "project_slug")?,
            status: required_str(obj, "status")?.parse()?,
            started_by: required_str(obj, "started_by")?,
            created_at: required_timestamp(obj, "created_at", WORKFLOW_TIMESTAMP_FORMAT)?,
            stopped_at: optional_timestamp(obj, "stopped_at", WORKFLOW_TIMESTAMP_FORMAT)?,
        })
    }

    pub fn in_progress(&self) -> bool {
        self.stopped_at.is_none()
    }
}

/// The workflows of one pipeline, in response order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WorkflowList(Vec<Workflow>);

impl WorkflowList {
    pub fn new(workflows: Vec<Workflow>) -> Self {
        Self(workflows)
    }

    /// Maps a workflow listing, either a bare list or an object with `items`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedResponse` for any other shape, or the first mapping
    /// error of an item.
    pub fn from_json(value: &Value) -> Result<Self> {
        items_of(value, "workflows")?
            .iter()
            .map(Workflow::from_json)
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// True iff there is at least one workflow and none is in progress.
    ///
    /// An empty list counts as not stopped: a pipeline whose workflows have
    /// not been created yet must not look finished.
    pub fn all_stopped(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|w| !w.in_progress())
    }

    /// True iff every workflow has `status`. Vacuously true when empty.
    pub fn all_have_status(&self, status: WorkflowStatus) -> bool {
        self.0.iter().all(|w| w.status == status)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Workflow> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Workflow] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a WorkflowList {
    type Item = &'a Workflow;
    type IntoIter = std::slice::Iter<'a, Workflow>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for WorkflowList {
    type Item = Workflow;
    type IntoIter = std::vec::IntoIter<Workflow>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
