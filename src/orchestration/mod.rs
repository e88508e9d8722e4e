//! # Orchestration
//!
//! Task dedup and execution: the [`Coordinator`] admits intents and the
//! [`ExecutionUnit`] drives one accepted task to a terminal state.

pub mod coordinator;
pub mod errors;
pub mod execution_unit;
pub mod types;

pub use coordinator::Coordinator;
pub use errors::ExecutionFailure;
pub use execution_unit::ExecutionUnit;
pub use types::{AdmissionOutcome, CoordinatorSettings, ExecutionReport, PollPolicy};
