//! Asynchronous job snapshots
//!
//! Stack updates and restarts are queued on the SiteHost side and answered
//! with a job id. [`Job`] is a one-shot view of that job's status, taken from
//! a single `job/get` reply. It is not a live handle: observing a transition
//! means fetching the job again.
//!
//! An unusable reply always derives [`JobState::Failed`]. A poller that can
//! not reach the API therefore sees a terminal state and stops, instead of
//! waiting on an "unknown" state forever.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response::Response;

/// Which queue a job lives in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    #[default]
    Scheduler,
    Daemon,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Scheduler => "scheduler",
            JobType::Daemon => "daemon",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job status as reported by the API
///
/// The four known labels map to their variants. Any other label is kept
/// verbatim in [`JobState::Other`]; it is neither pending nor terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
    Other(String),
}

impl JobState {
    pub const PENDING: &'static str = "Pending";
    pub const RUNNING: &'static str = "Running";
    pub const COMPLETED: &'static str = "Completed";
    pub const FAILED: &'static str = "Failed";

    /// Exact, case-sensitive match against the known labels
    pub fn from_label(label: &str) -> Self {
        match label {
            Self::PENDING => JobState::Pending,
            Self::RUNNING => JobState::Running,
            Self::COMPLETED => JobState::Completed,
            Self::FAILED => JobState::Failed,
            other => JobState::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobState::Pending => Self::PENDING,
            JobState::Running => Self::RUNNING,
            JobState::Completed => Self::COMPLETED,
            JobState::Failed => Self::FAILED,
            JobState::Other(label) => label,
        }
    }

    /// `Completed` and `Failed` carry no further information
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobState {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

impl Serialize for JobState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobState {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

/// Snapshot of an asynchronous job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    #[serde(flatten)]
    response: Response,
    state: JobState,
}

impl Job {
    /// Derive a job from a `job/get` reply
    ///
    /// Only a valid envelope is kept; anything else is replaced by the invalid
    /// envelope so the state can only ever come from real returned data.
    pub fn from_response(response: Response) -> Self {
        let response = if response.is_valid() {
            response
        } else {
            Response::invalid()
        };
        let state = derive_state(&response);
        Self { response, state }
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == JobState::Pending
    }

    pub fn is_running(&self) -> bool {
        self.state == JobState::Running
    }

    pub fn has_completed(&self) -> bool {
        self.state == JobState::Completed
    }

    pub fn has_failed(&self) -> bool {
        self.state == JobState::Failed
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn into_response(self) -> Response {
        self.response
    }
}

fn derive_state(response: &Response) -> JobState {
    if !response.is_valid() {
        return JobState::Failed;
    }

    match response.data_item("state") {
        Some(Value::String(label)) => JobState::from_label(label),
        Some(Value::Null) | None => JobState::Other(String::new()),
        Some(other) => JobState::Other(other.to_string()),
    }
}
