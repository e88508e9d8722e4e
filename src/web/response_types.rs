//! # Response Envelopes
//!
//! Successful responses are `{message, data}`; field names inside `data` are
//! camelCase.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{TargetState, Task};

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        self.with_status(StatusCode::OK)
    }
}

/// Body of `PUT .../states`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateChangeRequest {
    #[serde(default)]
    pub state: Option<String>,
}

/// `data` for a newly accepted task
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateChangeAccepted {
    pub task_id: Uuid,
    pub target_name: String,
    pub target_state: TargetState,
    pub status: &'static str,
    pub message: String,
}

impl From<&Task> for StateChangeAccepted {
    fn from(task: &Task) -> Self {
        Self {
            task_id: task.task_id,
            target_name: task.target_name.clone(),
            target_state: task.target_state,
            status: "processing",
            message: format!(
                "Execution unit spawned to change server state to {}. It will poll until the change is confirmed.",
                task.target_state
            ),
        }
    }
}

/// `data` when another task already owns the target
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateChangeInProgress {
    pub task_id: Uuid,
    pub target_name: String,
    pub current_processing_state: TargetState,
    pub requested_state: TargetState,
    pub status: &'static str,
    pub started_at: DateTime<Utc>,
    pub message: String,
}

impl StateChangeInProgress {
    pub fn new(existing: &Task, requested_state: TargetState) -> Self {
        let message = if existing.target_state == requested_state {
            format!(
                "A worker is already processing the state change to {}. Please wait for it to complete.",
                requested_state
            )
        } else {
            format!(
                "A worker is currently changing the server state to {}. Please wait for it to complete before requesting a change to {}.",
                existing.target_state, requested_state
            )
        };

        Self {
            task_id: existing.task_id,
            target_name: existing.target_name.clone(),
            current_processing_state: existing.target_state,
            requested_state,
            status: "already_processing",
            started_at: existing.started_at,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_progress_serializes_camel_case() {
        let existing = Task::new("vm-1", TargetState::Up);
        let data = StateChangeInProgress::new(&existing, TargetState::Down);
        let value = serde_json::to_value(&data).unwrap();

        assert_eq!(value["currentProcessingState"], "UP");
        assert_eq!(value["requestedState"], "DOWN");
        assert_eq!(value["status"], "already_processing");
        assert!(value["message"].as_str().unwrap().contains("before requesting"));
    }

    #[test]
    fn test_request_state_is_optional() {
        let request: StateChangeRequest = serde_json::from_str("{}").unwrap();
        assert!(request.state.is_none());
    }
}
