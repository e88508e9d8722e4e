//! Error types for the statehook service.
//!
//! Each capability owns its own error enum (see [`crate::store::StoreError`],
//! [`crate::control_plane::ControlPlaneError`],
//! [`crate::notifications::NotificationError`]). The types here cover the
//! coordinator's admission path and process bootstrap.

use crate::config::ConfigurationError;
use crate::store::StoreError;
use thiserror::Error;

/// Failures surfaced synchronously to a caller of
/// [`crate::orchestration::Coordinator::request_state_change`].
///
/// An in-flight task owning the target is not an error; it is reported as
/// [`crate::orchestration::AdmissionOutcome::AlreadyInProgress`].
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// Bad caller input. Rejected before any store access, no task created.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The dedup check or the lock write could not reach the store.
    /// Retryable unless the stored record itself is corrupt; never
    /// downgraded to "proceed anyway".
    #[error("Task store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl AdmissionError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Whether the caller may retry the same request unchanged
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(e) if !matches!(e, StoreError::SerializationError(_)))
    }
}

/// Top-level error for bootstrap and process lifecycle
#[derive(Debug, Error)]
pub enum StatehookError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Task store error: {0}")]
    Store(#[from] StoreError),

    #[error("Control plane client error: {0}")]
    ControlPlane(#[from] crate::control_plane::ControlPlaneError),

    #[error("Notification sink error: {0}")]
    Notification(#[from] crate::notifications::NotificationError),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StatehookError>;
