#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Statehook
//!
//! Webhook service that drives a named compute instance to a requested power
//! state, with at most one in-flight change per instance.
//!
//! ## Architecture
//!
//! ```text
//! HTTP (web) -> Coordinator -> TaskStore::claim
//!                    |
//!                    '-> ExecutionUnit (tokio task, one per accepted intent)
//!                          |-> ControlPlane (authenticate, locate, transition, poll)
//!                          |-> TaskStore::finish (terminal record, short TTL)
//!                          '-> NotificationSink (fire-and-forget)
//! ```
//!
//! The shared task store is the only source of truth for dedup. Admission is
//! an atomic claim on a key derived from the instance name, so correctness
//! holds across processes and restarts as long as the store persists.
//!
//! ## Module Organization
//!
//! - [`models`] - Task record and instance observations
//! - [`store`] - Shared task store trait with Redis and in-memory backends
//! - [`control_plane`] - Control-plane capability and the OpenStack client
//! - [`notifications`] - Notification sink and webhook notifier
//! - [`state_machine`] - Execution unit phases
//! - [`orchestration`] - Coordinator and execution unit
//! - [`web`] - axum HTTP surface
//! - [`config`] - Layered configuration
//! - [`logging`] - Structured logging setup
//! - [`error`] - Admission and bootstrap errors

pub mod bootstrap;
pub mod config;
pub mod control_plane;
pub mod error;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod orchestration;
pub mod state_machine;
pub mod store;
pub mod validation;
pub mod web;

pub use config::{AppConfig, ConfigLoader};
pub use error::{AdmissionError, Result, StatehookError};
pub use models::{task_key, InstanceObservation, TargetState, Task, TaskStatus};
pub use orchestration::{AdmissionOutcome, Coordinator, CoordinatorSettings, PollPolicy};
pub use store::{ClaimOutcome, TaskStore};
