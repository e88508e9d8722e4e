//! # Data Models
//!
//! - [`task`] - the coordinated task record and its status lifecycle
//! - [`instance`] - control-plane observations of a target instance

pub mod instance;
pub mod task;

pub use instance::{InstanceObservation, FATAL_STATUS};
pub use task::{
    task_key, TargetState, Task, TaskStatus, TaskTransitionError, MAX_TARGET_NAME_LENGTH,
};
