//! Builders and wait helpers shared by the integration tests

use std::sync::Arc;
use std::time::Duration;

use statehook::models::{task_key, Task};
use statehook::orchestration::{Coordinator, CoordinatorSettings, PollPolicy};
use statehook::store::TaskStore;

use super::mocks::{MockControlPlane, RecordingNotifier};

pub const PREFIX: &str = "worker:server";

/// Short intervals so units finish in milliseconds
pub fn fast_settings(max_attempts: u32) -> CoordinatorSettings {
    CoordinatorSettings {
        key_prefix: PREFIX.to_string(),
        processing_ttl: Duration::from_secs(60),
        terminal_ttl: Duration::from_secs(30),
        poll_policy: PollPolicy::new(max_attempts, Duration::from_millis(10)),
    }
}

pub fn key(target_name: &str) -> String {
    task_key(PREFIX, target_name)
}

pub fn coordinator(
    store: Arc<dyn TaskStore>,
    control_plane: &MockControlPlane,
    notifier: &RecordingNotifier,
    settings: CoordinatorSettings,
) -> Arc<Coordinator> {
    Arc::new(Coordinator::new(
        store,
        Arc::new(control_plane.clone()),
        Arc::new(notifier.clone()),
        settings,
    ))
}

/// Poll the store until the record at `key` is terminal
pub async fn wait_for_terminal(store: &dyn TaskStore, key: &str, timeout: Duration) -> Task {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(task) = store.get(key).await.unwrap() {
            if task.status.is_terminal() {
                return task;
            }
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "task at {key} did not reach a terminal status within {timeout:?}"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Wait until the coordinator has no units in flight
pub async fn wait_until_idle(coordinator: &Coordinator, timeout: Duration) {
    let deadline = tokio::time::Instant::now() + timeout;
    while coordinator.active_units() > 0 {
        assert!(
            tokio::time::Instant::now() < deadline,
            "execution units still running after {timeout:?}"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
