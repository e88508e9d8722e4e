use super::errors::{StateMachineError, StateMachineResult};
use super::events::ExecutionEvent;
use super::states::ExecutionState;
use tracing::debug;

/// Tracks one execution unit's phase and the path it took
#[derive(Debug, Clone)]
pub struct ExecutionStateMachine {
    current: ExecutionState,
    path: Vec<ExecutionState>,
}

impl Default for ExecutionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionStateMachine {
    pub fn new() -> Self {
        Self {
            current: ExecutionState::Authenticating,
            path: vec![ExecutionState::Authenticating],
        }
    }

    pub fn current_state(&self) -> ExecutionState {
        self.current
    }

    /// Every state visited, starting with `Authenticating`
    pub fn path(&self) -> &[ExecutionState] {
        &self.path
    }

    pub fn into_path(self) -> Vec<ExecutionState> {
        self.path
    }

    /// Apply an event, rejecting edges the state graph does not allow
    pub fn transition(&mut self, event: ExecutionEvent) -> StateMachineResult<ExecutionState> {
        let target = event.target_state();
        if !self.current.can_transition_to(target) {
            return Err(StateMachineError::InvalidTransition {
                from: self.current.to_string(),
                event: event.event_type().to_string(),
            });
        }

        debug!(
            from = %self.current,
            to = %target,
            event = event.event_type(),
            "Execution state transition"
        );
        self.current = target;
        self.path.push(target);
        Ok(target)
    }
}
