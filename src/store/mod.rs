//! # Shared Task Store
//!
//! Holds the single-flight lock record for each target instance.
//!
//! ```text
//! TaskStore (trait, Arc<dyn TaskStore>)
//!   ├── RedisTaskStore     <- ConnectionManager + Lua claim script
//!   └── InMemoryTaskStore  <- single-process backend, lazy TTL expiry
//! ```
//!
//! The store is the only source of truth for dedup. Admission goes through
//! [`TaskStore::claim`], which is atomic in every backend, so two concurrent
//! intents for the same target can never both observe "no task".

pub mod errors;
pub mod providers;
pub mod traits;

pub use errors::{StoreError, StoreResult};
pub use providers::{InMemoryTaskStore, RedisTaskStore};
pub use traits::{ClaimOutcome, TaskStore};

use crate::config::{StoreBackend, StoreConfig};
use std::sync::Arc;
use tracing::info;

/// Build the configured store backend. Connects once; the returned handle is
/// shared by reference for the life of the process.
pub async fn connect(config: &StoreConfig) -> StoreResult<Arc<dyn TaskStore>> {
    let store: Arc<dyn TaskStore> = match config.backend {
        StoreBackend::Redis => Arc::new(RedisTaskStore::connect(&config.redis_url).await?),
        StoreBackend::Memory => Arc::new(InMemoryTaskStore::new()),
    };

    info!(provider = store.provider_name(), "Task store initialized");
    Ok(store)
}
