//! Task store trait definition

use super::errors::StoreResult;
use crate::models::Task;
use async_trait::async_trait;
use std::time::Duration;

/// Outcome of an atomic admission claim
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// The record was written; the caller now owns the key
    Claimed,
    /// A PROCESSING task already owns the key; nothing was written
    Held(Task),
}

/// Shared key/value store with per-key expiry holding one task record per
/// target instance.
///
/// Implementations are shared across the coordinator and every execution
/// unit, so they must be safe to call concurrently.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns the record at `key`, or `None` when absent or expired
    async fn get(&self, key: &str) -> StoreResult<Option<Task>>;

    /// Unconditionally upserts `task` at `key` with the given expiry
    async fn put(&self, key: &str, task: &Task, ttl: Duration) -> StoreResult<()>;

    /// Removes the record at `key`. Idempotent.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Atomically writes `task` at `key` unless a PROCESSING record is
    /// already there. Terminal or absent records are replaced.
    async fn claim(&self, key: &str, task: &Task, ttl: Duration) -> StoreResult<ClaimOutcome>;

    /// Atomically writes `task` at `key` only if the key is absent or still
    /// holds a record with the same `task_id`. Returns whether it wrote.
    ///
    /// Keeps a unit whose lock expired and was re-claimed from overwriting
    /// the newer task's record.
    async fn finish(&self, key: &str, task: &Task, ttl: Duration) -> StoreResult<bool>;

    /// Check if the store backend is reachable
    async fn health_check(&self) -> StoreResult<bool>;

    /// Name of the backing provider
    fn provider_name(&self) -> &'static str;
}
