//! # Orchestration Types
//!
//! Values passed between the coordinator and its execution units.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use crate::config::{ExecutionConfig, StoreConfig};
use crate::models::{TargetState, Task};
use crate::state_machine::ExecutionState;

/// Fixed-interval polling bound for the confirmation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl PollPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Total sleep time if every attempt is used
    pub fn budget(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(30, Duration::from_secs(10))
    }
}

impl From<&ExecutionConfig> for PollPolicy {
    fn from(config: &ExecutionConfig) -> Self {
        Self::new(config.max_poll_attempts, config.poll_interval())
    }
}

/// Everything the coordinator needs besides its capabilities
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub key_prefix: String,
    /// Expiry of a PROCESSING record; bounds an orphaned lock
    pub processing_ttl: Duration,
    /// Expiry of a COMPLETED/FAILED record
    pub terminal_ttl: Duration,
    pub poll_policy: PollPolicy,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            key_prefix: "worker:server".to_string(),
            processing_ttl: Duration::from_secs(600),
            terminal_ttl: Duration::from_secs(300),
            poll_policy: PollPolicy::default(),
        }
    }
}

impl CoordinatorSettings {
    pub fn from_config(store: &StoreConfig, execution: &ExecutionConfig) -> Self {
        Self {
            key_prefix: store.key_prefix.clone(),
            processing_ttl: store.processing_ttl(),
            terminal_ttl: store.terminal_ttl(),
            poll_policy: PollPolicy::from(execution),
        }
    }
}

/// Result of admitting a state-change intent
#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionOutcome {
    /// A new task owns the target and its execution unit is running
    Accepted(Task),
    /// A PROCESSING task already owns the target
    AlreadyInProgress {
        existing: Task,
        requested_state: TargetState,
    },
}

impl AdmissionOutcome {
    /// Id of the task that owns the target after admission
    pub fn task_id(&self) -> Uuid {
        match self {
            Self::Accepted(task) => task.task_id,
            Self::AlreadyInProgress { existing, .. } => existing.task_id,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Terminal result an execution unit reports to its owner
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    pub task_id: Uuid,
    pub target_name: String,
    pub target_state: TargetState,
    pub final_state: ExecutionState,
    pub transitions: Vec<ExecutionState>,
    /// Poll attempts consumed; zero on the short-circuit path
    pub attempts: u32,
    pub instance_id: Option<String>,
    /// Last control-plane status observed
    pub final_status: Option<String>,
    pub error: Option<String>,
    /// Whether the terminal record reached the store
    pub recorded: bool,
    pub finished_at: DateTime<Utc>,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        self.final_state.is_success()
    }
}
