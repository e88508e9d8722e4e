use super::states::ExecutionState;
use serde::{Deserialize, Serialize};

/// Events that move an execution unit between phases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ExecutionEvent {
    /// Token obtained
    Authenticated,
    /// Target found and not yet in the requested state
    Located,
    /// Target found already in the requested state
    AlreadySatisfied,
    /// Power action accepted by the control plane
    TransitionRequested,
    /// Observed status matched the request
    TargetConfirmed,
    /// All poll attempts used up
    PollBudgetExhausted,
    /// Unrecoverable failure with message
    Fail(String),
}

impl ExecutionEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Authenticated => "authenticated",
            Self::Located => "located",
            Self::AlreadySatisfied => "already_satisfied",
            Self::TransitionRequested => "transition_requested",
            Self::TargetConfirmed => "target_confirmed",
            Self::PollBudgetExhausted => "poll_budget_exhausted",
            Self::Fail(_) => "fail",
        }
    }

    /// State this event leads to
    pub fn target_state(&self) -> ExecutionState {
        match self {
            Self::Authenticated => ExecutionState::Locating,
            Self::Located => ExecutionState::Transitioning,
            Self::AlreadySatisfied => ExecutionState::Confirmed,
            Self::TransitionRequested => ExecutionState::Polling,
            Self::TargetConfirmed => ExecutionState::Confirmed,
            Self::PollBudgetExhausted => ExecutionState::TimedOut,
            Self::Fail(_) => ExecutionState::Errored,
        }
    }
}
