//! Control-plane client error types

use thiserror::Error;

/// Result type for control-plane operations
pub type ControlPlaneResult<T> = Result<T, ControlPlaneError>;

/// Failures talking to the control plane, classified by cause so the
/// execution unit can report actionable diagnostics
#[derive(Debug, Error)]
pub enum ControlPlaneError {
    /// Credentials rejected or no token issued
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// HTTP 404 from the control plane
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// HTTP 409 from the control plane (instance in an incompatible state)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other non-success HTTP status
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ControlPlaneError {
    /// Classify a non-success HTTP response
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => Self::AuthFailed(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            _ => Self::ApiError { status, message },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
