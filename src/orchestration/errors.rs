//! Execution-unit failure taxonomy
//!
//! Each variant ends exactly one task as FAILED; its display text becomes the
//! task record's `error`.

use std::time::Duration;
use thiserror::Error;

use crate::control_plane::ControlPlaneError;
use crate::state_machine::StateMachineError;

#[derive(Debug, Error)]
pub enum ExecutionFailure {
    #[error("Failed to obtain authentication token: {0}")]
    AuthFailure(String),

    #[error("Server not found: {target_name}. Please verify the server name is correct and exists in OpenStack.")]
    TargetNotFound { target_name: String },

    #[error("Server not found during state change: {target_name}. The server may have been deleted.")]
    TargetDeleted { target_name: String },

    #[error("Cannot change server state: Server {target_name} is in a conflicting state or operation is not allowed.")]
    TransitionRejected { target_name: String },

    #[error("Server state change not confirmed after {attempts} attempts ({elapsed:?})")]
    ConfirmationTimeout { attempts: u32, elapsed: Duration },

    #[error("Server {target_name} entered {status} state during transition")]
    TargetEnteredFatalState { target_name: String, status: String },

    #[error("Control plane request failed: {0}")]
    ControlPlane(#[from] ControlPlaneError),

    #[error("Execution state machine rejected a transition: {0}")]
    InvalidTransition(#[from] StateMachineError),
}

impl ExecutionFailure {
    /// Stable label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuthFailure(_) => "auth_failure",
            Self::TargetNotFound { .. } => "target_not_found",
            Self::TargetDeleted { .. } => "target_deleted",
            Self::TransitionRejected { .. } => "transition_rejected",
            Self::ConfirmationTimeout { .. } => "confirmation_timeout",
            Self::TargetEnteredFatalState { .. } => "target_entered_fatal_state",
            Self::ControlPlane(_) => "control_plane",
            Self::InvalidTransition(_) => "invalid_transition",
        }
    }

    /// Classify a failed transition request
    pub fn from_transition_error(target_name: &str, error: ControlPlaneError) -> Self {
        if error.is_not_found() {
            Self::TargetDeleted {
                target_name: target_name.to_string(),
            }
        } else if error.is_conflict() {
            Self::TransitionRejected {
                target_name: target_name.to_string(),
            }
        } else {
            Self::ControlPlane(error)
        }
    }
}
