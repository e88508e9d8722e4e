// State machine for a single execution unit
//
// Tracks the phase of one power-state change and refuses edges outside the
// allowed graph. The recorded path ends up in the unit's report.

pub mod errors;
pub mod events;
pub mod execution_state_machine;
pub mod states;

pub use errors::{StateMachineError, StateMachineResult};
pub use events::ExecutionEvent;
pub use execution_state_machine::ExecutionStateMachine;
pub use states::ExecutionState;
