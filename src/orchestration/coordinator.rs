//! # Coordinator
//!
//! Admits state-change intents and spawns one execution unit per accepted
//! task. Mutual exclusion per target comes from two layers:
//!
//! - an in-process guard serializing admission for the same dedup key
//! - [`TaskStore::claim`], atomic in the store itself, which is what holds
//!   across processes
//!
//! The coordinator never writes a task record after admission. Units report
//! their terminal result over a oneshot channel and the coordinator only logs
//! it.

use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::execution_unit::ExecutionUnit;
use super::types::{AdmissionOutcome, CoordinatorSettings, ExecutionReport};
use crate::control_plane::ControlPlane;
use crate::error::AdmissionError;
use crate::models::{task_key, TargetState, Task};
use crate::notifications::NotificationSink;
use crate::store::{ClaimOutcome, TaskStore};
use crate::validation::{validate_intent, validate_target_name};

/// Single-flight admission and execution-unit spawning
pub struct Coordinator {
    store: Arc<dyn TaskStore>,
    control_plane: Arc<dyn ControlPlane>,
    notifier: Arc<dyn NotificationSink>,
    settings: CoordinatorSettings,
    admission_guards: DashMap<String, Arc<Mutex<()>>>,
    active_units: Arc<AtomicUsize>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("store", &self.store.provider_name())
            .field("settings", &self.settings)
            .field("active_units", &self.active_units())
            .finish()
    }
}

impl Coordinator {
    pub fn new(
        store: Arc<dyn TaskStore>,
        control_plane: Arc<dyn ControlPlane>,
        notifier: Arc<dyn NotificationSink>,
        settings: CoordinatorSettings,
    ) -> Self {
        info!(
            store = store.provider_name(),
            notifier = notifier.sink_name(),
            key_prefix = %settings.key_prefix,
            max_poll_attempts = settings.poll_policy.max_attempts,
            "🚀 COORDINATOR: Initialized"
        );

        Self {
            store,
            control_plane,
            notifier,
            settings,
            admission_guards: DashMap::new(),
            active_units: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    /// Execution units spawned by this process that have not reported yet
    pub fn active_units(&self) -> usize {
        self.active_units.load(Ordering::SeqCst)
    }

    /// Dedup key for a target
    pub fn key_for(&self, target_name: &str) -> String {
        task_key(&self.settings.key_prefix, target_name)
    }

    /// Validate an intent and admit it.
    ///
    /// Returns `Accepted` with the new task when this call took ownership of
    /// the target, or `AlreadyInProgress` with the owning task otherwise,
    /// whatever state that task is driving toward. Never waits on the unit.
    #[instrument(skip_all, fields(target_name = %target_name, requested_state = %raw_state))]
    pub async fn request_state_change(
        &self,
        target_name: &str,
        raw_state: &str,
    ) -> Result<AdmissionOutcome, AdmissionError> {
        let target_state = validate_intent(target_name, raw_state)?;
        self.admit(target_name, target_state).await
    }

    /// Admission for an already-validated target state
    pub async fn admit(
        &self,
        target_name: &str,
        target_state: TargetState,
    ) -> Result<AdmissionOutcome, AdmissionError> {
        validate_target_name(target_name)?;
        let key = self.key_for(target_name);

        let guard = Arc::clone(&self.admission_guards.entry(key.clone()).or_default());
        let outcome = {
            let _serialized = guard.lock().await;
            self.claim_or_report(&key, target_name, target_state).await
        };
        drop(guard);
        self.admission_guards
            .remove_if(&key, |_, guard| Arc::strong_count(guard) == 1);

        outcome
    }

    async fn claim_or_report(
        &self,
        key: &str,
        target_name: &str,
        target_state: TargetState,
    ) -> Result<AdmissionOutcome, AdmissionError> {
        let task = Task::new(target_name, target_state);

        match self
            .store
            .claim(key, &task, self.settings.processing_ttl)
            .await
        {
            Ok(ClaimOutcome::Held(existing)) => {
                info!(
                    existing_task_id = %existing.task_id,
                    existing_target_state = %existing.target_state,
                    started_at = %existing.started_at,
                    "Task already processing for server state change"
                );
                Ok(AdmissionOutcome::AlreadyInProgress {
                    existing,
                    requested_state: target_state,
                })
            }
            Ok(ClaimOutcome::Claimed) => {
                info!(task_id = %task.task_id, "✅ COORDINATOR: Task claimed, spawning execution unit");
                self.spawn_unit(task.clone(), key.to_string());
                Ok(AdmissionOutcome::Accepted(task))
            }
            Err(e) => {
                error!(error = %e, "Task store unavailable during admission");
                Err(AdmissionError::StoreUnavailable(e))
            }
        }
    }

    fn spawn_unit(&self, task: Task, key: String) {
        let (report_tx, report_rx) = oneshot::channel::<ExecutionReport>();
        let task_id = task.task_id;
        let target_name = task.target_name.clone();

        let unit = ExecutionUnit::new(
            task,
            key,
            self.settings.poll_policy,
            self.settings.terminal_ttl,
            Arc::clone(&self.store),
            Arc::clone(&self.control_plane),
            Arc::clone(&self.notifier),
        );

        self.active_units.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            let report = unit.run().await;
            if report_tx.send(report).is_err() {
                debug!(task_id = %task_id, "Coordinator no longer listening for report");
            }
        });

        tokio::spawn(supervise(
            task_id,
            target_name,
            report_rx,
            Arc::clone(&self.active_units),
        ));
    }

    /// Current record for a target, if one has not expired
    pub async fn task_status(&self, target_name: &str) -> Result<Option<Task>, AdmissionError> {
        validate_target_name(target_name)?;
        Ok(self.store.get(&self.key_for(target_name)).await?)
    }
}

/// Log the unit's terminal result. No store writes happen here.
async fn supervise(
    task_id: Uuid,
    target_name: String,
    report_rx: oneshot::Receiver<ExecutionReport>,
    active_units: Arc<AtomicUsize>,
) {
    let received = report_rx.await;
    active_units.fetch_sub(1, Ordering::SeqCst);

    match received {
        Ok(report) if report.is_success() => {
            info!(
                task_id = %report.task_id,
                target_name = %report.target_name,
                target_state = %report.target_state,
                final_status = report.final_status.as_deref().unwrap_or("unknown"),
                attempts = report.attempts,
                recorded = report.recorded,
                "🎉 COORDINATOR: Execution unit successfully updated server state"
            );
        }
        Ok(report) => {
            warn!(
                task_id = %report.task_id,
                target_name = %report.target_name,
                final_state = %report.final_state,
                error = report.error.as_deref().unwrap_or("unknown"),
                attempts = report.attempts,
                recorded = report.recorded,
                "COORDINATOR: Execution unit failed to update server state"
            );
        }
        Err(_) => {
            error!(
                task_id = %task_id,
                target_name = %target_name,
                "COORDINATOR: Execution unit exited without reporting; task record will expire via TTL"
            );
        }
    }
}
