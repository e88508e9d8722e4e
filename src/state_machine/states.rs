use serde::{Deserialize, Serialize};
use std::fmt;

/// Phases an execution unit moves through while driving one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    /// Obtaining a control-plane token
    Authenticating,
    /// Resolving the target name to an instance
    Locating,
    /// Issuing the power action
    Transitioning,
    /// Waiting for the observed status to match the request
    Polling,
    /// Target observed in the requested state
    Confirmed,
    /// Poll budget exhausted without confirmation
    TimedOut,
    /// Any other failure
    Errored,
}

impl ExecutionState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::TimedOut | Self::Errored)
    }

    /// Whether the unit ended in success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Confirmed)
    }

    /// Allowed edges. Every non-terminal state may fail into `Errored`.
    pub fn can_transition_to(&self, next: ExecutionState) -> bool {
        use ExecutionState::*;
        match (self, next) {
            (from, Errored) => !from.is_terminal(),
            (Authenticating, Locating) => true,
            // Locating straight to Confirmed is the already-satisfied short circuit
            (Locating, Transitioning) | (Locating, Confirmed) => true,
            (Transitioning, Polling) => true,
            (Polling, Confirmed) | (Polling, TimedOut) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticating => write!(f, "authenticating"),
            Self::Locating => write!(f, "locating"),
            Self::Transitioning => write!(f, "transitioning"),
            Self::Polling => write!(f, "polling"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::TimedOut => write!(f, "timed_out"),
            Self::Errored => write!(f, "errored"),
        }
    }
}

impl std::str::FromStr for ExecutionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authenticating" => Ok(Self::Authenticating),
            "locating" => Ok(Self::Locating),
            "transitioning" => Ok(Self::Transitioning),
            "polling" => Ok(Self::Polling),
            "confirmed" => Ok(Self::Confirmed),
            "timed_out" => Ok(Self::TimedOut),
            "errored" => Ok(Self::Errored),
            _ => Err(format!("Invalid execution state: {s}")),
        }
    }
}
