//! # Task Model
//!
//! One coordinated attempt to drive a named instance to a target power state.
//! The serialized form is the record held under the task's dedup key in the
//! shared task store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Maximum accepted length of a target instance name, in characters
pub const MAX_TARGET_NAME_LENGTH: usize = 255;

/// Requested end state of a target instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetState {
    /// Powered on
    Up,
    /// Powered off
    Down,
}

impl TargetState {
    pub const ALL: [TargetState; 2] = [TargetState::Up, TargetState::Down];

    /// Control-plane statuses that confirm the instance reached this state
    pub fn success_statuses(&self) -> &'static [&'static str] {
        match self {
            Self::Up => &["ACTIVE"],
            Self::Down => &["SHUTOFF"],
        }
    }

    /// Whether an observed control-plane status satisfies this state
    pub fn is_satisfied_by(&self, observed_status: &str) -> bool {
        self.success_statuses().contains(&observed_status)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TargetState {
    type Err = String;

    /// Case-insensitive parse of `up`/`down`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UP" => Ok(Self::Up),
            "DOWN" => Ok(Self::Down),
            _ => Err(format!(
                "Invalid state value '{s}'. State must be one of: {}",
                Self::ALL.map(|state| state.as_str()).join(", ")
            )),
        }
    }
}

/// Coordination status of a task record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// An execution unit owns the target and is driving it
    Processing,
    /// The target was confirmed in its requested state
    Completed,
    /// The execution unit gave up; see [`Task::error`]
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Rejected attempt to move a task out of a terminal status
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Task {task_id} is already {current}, cannot transition to {requested}")]
pub struct TaskTransitionError {
    pub task_id: Uuid,
    pub current: TaskStatus,
    pub requested: TaskStatus,
}

/// Task record as stored under its dedup key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub task_id: Uuid,
    pub target_name: String,
    pub target_state: TargetState,
    pub status: TaskStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Task {
    /// Fresh PROCESSING task with a new id
    pub fn new(target_name: impl Into<String>, target_state: TargetState) -> Self {
        Self {
            task_id: Uuid::new_v4(),
            target_name: target_name.into(),
            target_state,
            status: TaskStatus::Processing,
            started_at: Utc::now(),
            completed_at: None,
            error: None,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.status == TaskStatus::Processing
    }

    /// PROCESSING -> COMPLETED
    pub fn mark_completed(&mut self) -> Result<(), TaskTransitionError> {
        self.finish(TaskStatus::Completed, None)
    }

    /// PROCESSING -> FAILED, recording the cause
    pub fn mark_failed(&mut self, error: impl Into<String>) -> Result<(), TaskTransitionError> {
        self.finish(TaskStatus::Failed, Some(error.into()))
    }

    fn finish(
        &mut self,
        status: TaskStatus,
        error: Option<String>,
    ) -> Result<(), TaskTransitionError> {
        if self.status.is_terminal() {
            return Err(TaskTransitionError {
                task_id: self.task_id,
                current: self.status,
                requested: status,
            });
        }

        self.status = status;
        self.completed_at = Some(Utc::now());
        self.error = error;
        Ok(())
    }
}

/// Derives the dedup key for a target. Every intent for the same name lands
/// on the same key, whichever process issued it.
pub fn task_key(prefix: &str, target_name: &str) -> String {
    format!("{prefix}:{target_name}:state_change")
}
