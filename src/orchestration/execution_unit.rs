//! # Execution Unit
//!
//! Drives one task end to end:
//!
//! ```text
//! Authenticating -> Locating -> Transitioning -> Polling -> Confirmed
//!                       |                           |-> TimedOut
//!                       '-> Confirmed (already in requested state)
//! any non-terminal state -> Errored
//! ```
//!
//! Every failure is contained here: it ends this task as FAILED, is recorded
//! in the store, and is announced through the notification sink. Nothing a
//! unit does can fail the owning process.

use chrono::Utc;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use super::errors::ExecutionFailure;
use super::types::{ExecutionReport, PollPolicy};
use crate::control_plane::{AuthToken, ControlPlane};
use crate::logging::log_task_operation;
use crate::models::Task;
use crate::notifications::{dispatch, NotificationSink};
use crate::state_machine::{ExecutionEvent, ExecutionStateMachine};
use crate::store::TaskStore;

/// Facts gathered while driving, kept even when the unit fails midway
#[derive(Debug, Default)]
struct Progress {
    attempts: u32,
    instance_id: Option<String>,
    last_status: Option<String>,
}

/// One isolated run of a task. Owns nothing but what it was built with.
pub struct ExecutionUnit {
    task: Task,
    task_key: String,
    policy: PollPolicy,
    terminal_ttl: std::time::Duration,
    store: Arc<dyn TaskStore>,
    control_plane: Arc<dyn ControlPlane>,
    notifier: Arc<dyn NotificationSink>,
}

impl std::fmt::Debug for ExecutionUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionUnit")
            .field("task_id", &self.task.task_id)
            .field("task_key", &self.task_key)
            .field("policy", &self.policy)
            .finish()
    }
}

impl ExecutionUnit {
    pub fn new(
        task: Task,
        task_key: impl Into<String>,
        policy: PollPolicy,
        terminal_ttl: std::time::Duration,
        store: Arc<dyn TaskStore>,
        control_plane: Arc<dyn ControlPlane>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            task,
            task_key: task_key.into(),
            policy,
            terminal_ttl,
            store,
            control_plane,
            notifier,
        }
    }

    /// Run to a terminal state, record it, and return the report
    #[instrument(
        skip(self),
        fields(
            task_id = %self.task.task_id,
            target_name = %self.task.target_name,
            target_state = %self.task.target_state,
        )
    )]
    pub async fn run(self) -> ExecutionReport {
        info!(
            max_attempts = self.policy.max_attempts,
            poll_interval_ms = self.policy.interval.as_millis() as u64,
            "🚀 EXECUTION_UNIT: Starting server state update task"
        );

        let mut machine = ExecutionStateMachine::new();
        let mut progress = Progress::default();

        let result = self.drive(&mut machine, &mut progress).await;

        let error = match result {
            Ok(()) => None,
            Err(failure) => {
                if !machine.current_state().is_terminal() {
                    machine
                        .transition(ExecutionEvent::Fail(failure.to_string()))
                        .ok();
                }
                error!(
                    failure_kind = failure.kind(),
                    error = %failure,
                    state = %machine.current_state(),
                    "❌ EXECUTION_UNIT: Failed to update server state"
                );
                Some(failure.to_string())
            }
        };

        let recorded = self.record_terminal_status(error.as_deref()).await;
        self.notify_outcome(error.as_deref(), &progress);

        let final_state = machine.current_state();
        ExecutionReport {
            task_id: self.task.task_id,
            target_name: self.task.target_name.clone(),
            target_state: self.task.target_state,
            final_state,
            transitions: machine.into_path(),
            attempts: progress.attempts,
            instance_id: progress.instance_id,
            final_status: progress.last_status,
            error,
            recorded,
            finished_at: Utc::now(),
        }
    }

    async fn drive(
        &self,
        machine: &mut ExecutionStateMachine,
        progress: &mut Progress,
    ) -> Result<(), ExecutionFailure> {
        let target_name = self.task.target_name.as_str();
        let target_state = self.task.target_state;

        let token = self
            .control_plane
            .authenticate()
            .await
            .map_err(|e| ExecutionFailure::AuthFailure(e.to_string()))?;
        machine.transition(ExecutionEvent::Authenticated)?;
        debug!("Authentication successful");

        let instance = self
            .control_plane
            .list_instances(&token)
            .await?
            .into_iter()
            .find(|instance| instance.name == target_name)
            .ok_or_else(|| ExecutionFailure::TargetNotFound {
                target_name: target_name.to_string(),
            })?;

        info!(
            server_id = %instance.id,
            current_status = %instance.status,
            "Found server"
        );
        progress.instance_id = Some(instance.id.clone());
        progress.last_status = Some(instance.status.clone());

        if target_state.is_satisfied_by(&instance.status) {
            machine.transition(ExecutionEvent::AlreadySatisfied)?;
            info!(status = %instance.status, "✅ EXECUTION_UNIT: Server already in desired state");
            return Ok(());
        }

        machine.transition(ExecutionEvent::Located)?;
        dispatch(
            Arc::clone(&self.notifier),
            format!(
                "\"{}\" status will be changed from {} to {}",
                target_name, instance.status, target_state
            ),
        );

        info!(
            server_id = %instance.id,
            from = %instance.status,
            to = %target_state,
            "Initiating state change"
        );
        self.control_plane
            .request_transition(&token, &instance.id, target_state)
            .await
            .map_err(|e| ExecutionFailure::from_transition_error(target_name, e))?;
        machine.transition(ExecutionEvent::TransitionRequested)?;

        self.poll_until_confirmed(machine, &token, &instance.id, progress)
            .await
    }

    /// Fixed-interval confirmation loop. A failed fetch still uses up its
    /// attempt; the fatal status ends the loop at once.
    async fn poll_until_confirmed(
        &self,
        machine: &mut ExecutionStateMachine,
        token: &AuthToken,
        instance_id: &str,
        progress: &mut Progress,
    ) -> Result<(), ExecutionFailure> {
        let started = Instant::now();
        let target_state = self.task.target_state;

        while progress.attempts < self.policy.max_attempts {
            progress.attempts += 1;
            tokio::time::sleep(self.policy.interval).await;

            debug!(
                attempt = progress.attempts,
                max_attempts = self.policy.max_attempts,
                "Checking server status"
            );

            match self.control_plane.get_instance(token, instance_id).await {
                Ok(observation) => {
                    progress.last_status = Some(observation.status.clone());

                    if target_state.is_satisfied_by(&observation.status) {
                        machine.transition(ExecutionEvent::TargetConfirmed)?;
                        info!(
                            final_status = %observation.status,
                            attempts = progress.attempts,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "✅ EXECUTION_UNIT: Server state change confirmed"
                        );
                        return Ok(());
                    }

                    if observation.is_fatal() {
                        return Err(ExecutionFailure::TargetEnteredFatalState {
                            target_name: self.task.target_name.clone(),
                            status: observation.status,
                        });
                    }
                }
                Err(e) => {
                    warn!(
                        attempt = progress.attempts,
                        error = %e,
                        "Error checking server status"
                    );
                }
            }
        }

        machine.transition(ExecutionEvent::PollBudgetExhausted)?;
        Err(ExecutionFailure::ConfirmationTimeout {
            attempts: progress.attempts,
            elapsed: started.elapsed(),
        })
    }

    /// Best-effort terminal write with the short TTL. Skipped when another
    /// task has since claimed the key. Returns whether the record was written.
    async fn record_terminal_status(&self, error: Option<&str>) -> bool {
        let mut task = self.task.clone();
        let marked = match error {
            None => task.mark_completed(),
            Some(message) => task.mark_failed(message),
        };
        if let Err(e) = marked {
            error!(error = %e, "Task record already terminal");
            return false;
        }

        match self
            .store
            .finish(&self.task_key, &task, self.terminal_ttl)
            .await
        {
            Ok(true) => {
                log_task_operation(
                    "record_terminal_status",
                    task.task_id,
                    &task.target_name,
                    &task.status.to_string(),
                    task.error.as_deref(),
                );
                true
            }
            Ok(false) => {
                warn!(
                    task_key = %self.task_key,
                    "Task key now owned by a newer task; terminal status not written"
                );
                false
            }
            Err(e) => {
                error!(
                    task_key = %self.task_key,
                    error = %e,
                    "Failed to update task status in store"
                );
                false
            }
        }
    }

    fn notify_outcome(&self, error: Option<&str>, progress: &Progress) {
        let target_name = &self.task.target_name;
        let target_state = self.task.target_state;

        let message = match error {
            Some(cause) => format!(
                "Failed to update \"{}\" to {}: {}. Please check it immediately.",
                target_name, target_state, cause
            ),
            None if progress.attempts == 0 => format!(
                "\"{}\" is already {}; no change to {} was needed",
                target_name,
                progress.last_status.as_deref().unwrap_or("in the requested state"),
                target_state
            ),
            None => format!(
                "\"{}\" status has been changed to \"{}\"",
                target_name, target_state
            ),
        };

        dispatch(Arc::clone(&self.notifier), message);
    }
}
