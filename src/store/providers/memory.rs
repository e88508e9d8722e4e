//! In-memory task store provider
//!
//! Single-process backend for development and tests. Records expire lazily:
//! an expired entry is treated as absent and dropped on the next access.
//!
//! **Important**: state is NOT shared between processes. Running more than
//! one service instance against this backend gives no cross-process dedup.

use crate::models::Task;
use crate::store::errors::StoreResult;
use crate::store::traits::{ClaimOutcome, TaskStore};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Expiry used when `now + ttl` is not representable
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct Entry {
    task: Task,
    expires_at: Instant,
}

impl Entry {
    fn new(task: &Task, now: Instant, ttl: Duration) -> Self {
        let expires_at = now
            .checked_add(ttl)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        Self {
            task: task.clone(),
            expires_at,
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Task store held in process memory
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.lock().values().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remaining lifetime of the record at `key`
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .lock()
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.expires_at - now)
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Task>> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.task.clone())),
            Some(_) => {
                entries.remove(key);
                debug!(key = key, "Task record expired (memory)");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, task: &Task, ttl: Duration) -> StoreResult<()> {
        self.entries
            .lock()
            .insert(key.to_string(), Entry::new(task, Instant::now(), ttl));

        debug!(
            key = key,
            task_id = %task.task_id,
            status = %task.status,
            ttl_seconds = ttl.as_secs(),
            "Task record SET (memory)"
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.entries.lock().remove(key);
        debug!(key = key, "Task record DEL (memory)");
        Ok(())
    }

    async fn claim(&self, key: &str, task: &Task, ttl: Duration) -> StoreResult<ClaimOutcome> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        if let Some(entry) = entries.get(key) {
            if entry.is_live(now) && entry.task.is_processing() {
                return Ok(ClaimOutcome::Held(entry.task.clone()));
            }
        }

        entries.insert(key.to_string(), Entry::new(task, now, ttl));
        debug!(key = key, task_id = %task.task_id, "Task key claimed (memory)");
        Ok(ClaimOutcome::Claimed)
    }

    async fn finish(&self, key: &str, task: &Task, ttl: Duration) -> StoreResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        if let Some(entry) = entries.get(key) {
            if entry.is_live(now) && entry.task.task_id != task.task_id {
                debug!(
                    key = key,
                    task_id = %task.task_id,
                    owner_task_id = %entry.task.task_id,
                    "Task record finish skipped (memory)"
                );
                return Ok(false);
            }
        }

        entries.insert(key.to_string(), Entry::new(task, now, ttl));
        Ok(true)
    }

    async fn health_check(&self) -> StoreResult<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
