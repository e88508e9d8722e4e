//! # Server State Webhook Handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use std::sync::Arc;
use tracing::info;

use crate::models::Task;
use crate::orchestration::AdmissionOutcome;
use crate::web::errors::ApiError;
use crate::web::response_types::{
    ApiResponse, StateChangeAccepted, StateChangeInProgress, StateChangeRequest,
};
use crate::web::state::AppState;

/// `PUT /v1/webhooks/servers/{server_name}/states`
///
/// 200 when a new task was accepted, 202 when another task already owns the
/// server. The outcome of the change itself is only visible through
/// [`get_server_state`].
pub async fn update_server_state(
    State(state): State<Arc<AppState>>,
    Path(server_name): Path<String>,
    body: Result<Json<StateChangeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) =
        body.map_err(|rejection| ApiError::bad_request("Invalid request body", rejection.body_text()))?;
    let raw_state = request.state.unwrap_or_default();

    info!(
        server_name = %server_name,
        state = %raw_state,
        "Server state update webhook received"
    );

    let outcome = state
        .coordinator
        .request_state_change(&server_name, &raw_state)
        .await?;

    let response = match outcome {
        AdmissionOutcome::Accepted(task) => {
            ApiResponse::new("Server state change initiated", StateChangeAccepted::from(&task))
                .with_status(StatusCode::OK)
        }
        AdmissionOutcome::AlreadyInProgress {
            existing,
            requested_state,
        } => ApiResponse::new(
            "Server state change already in progress",
            StateChangeInProgress::new(&existing, requested_state),
        )
        .with_status(StatusCode::ACCEPTED),
    };

    Ok(response)
}

/// `GET /v1/webhooks/servers/{server_name}/states`
pub async fn get_server_state(
    State(state): State<Arc<AppState>>,
    Path(server_name): Path<String>,
) -> Result<ApiResponse<Task>, ApiError> {
    match state.coordinator.task_status(&server_name).await? {
        Some(task) => Ok(ApiResponse::new("Server state task found", task)),
        None => Err(ApiError::not_found(
            "Server state task not found",
            format!("No active or recent state change task for server '{server_name}'"),
        )),
    }
}
