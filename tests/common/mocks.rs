//! Hand-written mocks of the service capabilities
//!
//! Each mock keeps its state behind `Arc<Mutex<_>>` so tests can script
//! behavior up front and inspect calls afterward.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use statehook::control_plane::{AuthToken, ControlPlane, ControlPlaneError, ControlPlaneResult};
use statehook::models::{InstanceObservation, TargetState, Task};
use statehook::notifications::{NotificationError, NotificationSink};
use statehook::store::{ClaimOutcome, InMemoryTaskStore, StoreError, StoreResult, TaskStore};

/// One scripted answer to `get_instance`
#[derive(Debug, Clone)]
pub enum PollStep {
    Status(String),
    /// Transient failure of the fetch itself
    FetchError,
}

/// Scripted control-plane state and call log
#[derive(Debug, Default)]
pub struct MockControlPlaneState {
    pub instances: Vec<InstanceObservation>,
    pub poll_script: VecDeque<PollStep>,
    /// Returned once the script is used up
    pub steady_status: Option<String>,
    pub auth_fails: bool,
    pub transition_error_status: Option<u16>,
    pub transition_delay: Option<Duration>,
    pub auth_calls: usize,
    pub list_calls: usize,
    pub get_calls: usize,
    pub transition_calls: Vec<(String, TargetState)>,
}

/// Control plane double driven by [`MockControlPlaneState`]
#[derive(Debug, Clone, Default)]
pub struct MockControlPlane {
    state: Arc<Mutex<MockControlPlaneState>>,
}

impl MockControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instance(self, id: &str, name: &str, status: &str) -> Self {
        self.state.lock().unwrap().instances.push(InstanceObservation {
            id: id.to_string(),
            name: name.to_string(),
            status: status.to_string(),
        });
        self
    }

    /// Statuses returned by successive `get_instance` calls
    pub fn with_poll_statuses(self, statuses: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state
                .poll_script
                .extend(statuses.iter().map(|s| PollStep::Status(s.to_string())));
        }
        self
    }

    pub fn with_poll_steps(self, steps: Vec<PollStep>) -> Self {
        self.state.lock().unwrap().poll_script.extend(steps);
        self
    }

    pub fn with_steady_status(self, status: &str) -> Self {
        self.state.lock().unwrap().steady_status = Some(status.to_string());
        self
    }

    pub fn with_failing_auth(self) -> Self {
        self.state.lock().unwrap().auth_fails = true;
        self
    }

    pub fn with_transition_error(self, http_status: u16) -> Self {
        self.state.lock().unwrap().transition_error_status = Some(http_status);
        self
    }

    /// Hold each transition request open, keeping the unit in flight
    pub fn with_transition_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().transition_delay = Some(delay);
        self
    }

    pub fn auth_calls(&self) -> usize {
        self.state.lock().unwrap().auth_calls
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn get_calls(&self) -> usize {
        self.state.lock().unwrap().get_calls
    }

    pub fn transition_calls(&self) -> Vec<(String, TargetState)> {
        self.state.lock().unwrap().transition_calls.clone()
    }
}

#[async_trait]
impl ControlPlane for MockControlPlane {
    async fn authenticate(&self) -> ControlPlaneResult<AuthToken> {
        let mut state = self.state.lock().unwrap();
        state.auth_calls += 1;
        if state.auth_fails {
            return Err(ControlPlaneError::AuthFailed(
                "invalid credentials".to_string(),
            ));
        }
        Ok(AuthToken::new("mock-token"))
    }

    async fn list_instances(
        &self,
        _token: &AuthToken,
    ) -> ControlPlaneResult<Vec<InstanceObservation>> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        Ok(state.instances.clone())
    }

    async fn get_instance(
        &self,
        _token: &AuthToken,
        instance_id: &str,
    ) -> ControlPlaneResult<InstanceObservation> {
        let mut state = self.state.lock().unwrap();
        state.get_calls += 1;

        let name = state
            .instances
            .iter()
            .find(|i| i.id == instance_id)
            .map(|i| i.name.clone())
            .unwrap_or_default();

        let status = match state.poll_script.pop_front() {
            Some(PollStep::Status(status)) => status,
            Some(PollStep::FetchError) => {
                return Err(ControlPlaneError::ApiError {
                    status: 503,
                    message: "compute API unavailable".to_string(),
                })
            }
            None => state
                .steady_status
                .clone()
                .unwrap_or_else(|| "BUILD".to_string()),
        };

        Ok(InstanceObservation {
            id: instance_id.to_string(),
            name,
            status,
        })
    }

    async fn request_transition(
        &self,
        _token: &AuthToken,
        instance_id: &str,
        target: TargetState,
    ) -> ControlPlaneResult<()> {
        let (delay, error_status) = {
            let mut state = self.state.lock().unwrap();
            state
                .transition_calls
                .push((instance_id.to_string(), target));
            (state.transition_delay, state.transition_error_status)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match error_status {
            Some(status) => Err(ControlPlaneError::from_status(status, "rejected by mock")),
            None => Ok(()),
        }
    }
}

/// Notification sink that records every message
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records messages but reports every send as failed
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    /// Wait until at least `count` messages arrived or `timeout` elapsed
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<String> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let messages = self.messages();
            if messages.len() >= count || tokio::time::Instant::now() >= deadline {
                return messages;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn send(&self, message: &str) -> Result<(), NotificationError> {
        self.messages.lock().unwrap().push(message.to_string());
        if self.fail {
            return Err(NotificationError::Rejected { status: 500 });
        }
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "recording"
    }
}

/// Store whose backend is unreachable, or whose records no longer decode
#[derive(Debug, Clone, Default)]
pub struct FailingStore {
    calls: Arc<AtomicUsize>,
    corrupt: bool,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails as if the stored record were unreadable
    pub fn corrupt() -> Self {
        Self {
            corrupt: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn unavailable(&self) -> StoreError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.corrupt {
            StoreError::SerializationError("missing field `taskId`".to_string())
        } else {
            StoreError::ConnectionError("connection refused".to_string())
        }
    }
}

#[async_trait]
impl TaskStore for FailingStore {
    async fn get(&self, _key: &str) -> StoreResult<Option<Task>> {
        Err(self.unavailable())
    }

    async fn put(&self, _key: &str, _task: &Task, _ttl: Duration) -> StoreResult<()> {
        Err(self.unavailable())
    }

    async fn delete(&self, _key: &str) -> StoreResult<()> {
        Err(self.unavailable())
    }

    async fn claim(&self, _key: &str, _task: &Task, _ttl: Duration) -> StoreResult<ClaimOutcome> {
        Err(self.unavailable())
    }

    async fn finish(&self, _key: &str, _task: &Task, _ttl: Duration) -> StoreResult<bool> {
        Err(self.unavailable())
    }

    async fn health_check(&self) -> StoreResult<bool> {
        Err(self.unavailable())
    }

    fn provider_name(&self) -> &'static str {
        "failing"
    }
}

/// In-memory store that counts every call
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: InMemoryTaskStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TaskStore for CountingStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Task>> {
        self.record();
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, task: &Task, ttl: Duration) -> StoreResult<()> {
        self.record();
        self.inner.put(key, task, ttl).await
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.record();
        self.inner.delete(key).await
    }

    async fn claim(&self, key: &str, task: &Task, ttl: Duration) -> StoreResult<ClaimOutcome> {
        self.record();
        self.inner.claim(key, task, ttl).await
    }

    async fn finish(&self, key: &str, task: &Task, ttl: Duration) -> StoreResult<bool> {
        self.record();
        self.inner.finish(key, task, ttl).await
    }

    async fn health_check(&self) -> StoreResult<bool> {
        self.inner.health_check().await
    }

    fn provider_name(&self) -> &'static str {
        "counting"
    }
}
