//! # Web API Error Types
//!
//! Error responses use the `{message, reason}` envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::error::AdmissionError;
use crate::store::StoreError;

/// Web API errors with HTTP status code mappings
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}: {reason}")]
    BadRequest { message: String, reason: String },

    #[error("{message}: {reason}")]
    NotFound { message: String, reason: String },

    #[error("Service unavailable: {reason}")]
    ServiceUnavailable { reason: String },

    #[error("Internal server error: {reason}")]
    Internal { reason: String },
}

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(message: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let body = match self {
            Self::BadRequest { message, reason } | Self::NotFound { message, reason } => ErrorBody {
                message,
                reason: Some(reason),
            },
            Self::ServiceUnavailable { reason } => ErrorBody {
                message: "Task store unavailable, retry later".to_string(),
                reason: Some(reason),
            },
            Self::Internal { reason } => ErrorBody {
                message: "An error occurred processing your request".to_string(),
                reason: Some(reason),
            },
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<AdmissionError> for ApiError {
    fn from(err: AdmissionError) -> Self {
        match err {
            AdmissionError::InvalidInput(reason) => Self::bad_request("Invalid request", reason),
            // A record that no longer decodes will not start decoding on retry
            AdmissionError::StoreUnavailable(e @ StoreError::SerializationError(_)) => {
                Self::Internal {
                    reason: e.to_string(),
                }
            }
            AdmissionError::StoreUnavailable(e) => Self::ServiceUnavailable {
                reason: e.to_string(),
            },
        }
    }
}
