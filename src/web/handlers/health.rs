//! # Health Check Handler

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error};

use crate::web::response_types::ApiResponse;
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub uptime: f64,
    pub environment: String,
    pub version: &'static str,
    pub store: StoreHealth,
    pub active_units: usize,
}

#[derive(Debug, Serialize)]
pub struct StoreHealth {
    pub provider: &'static str,
    pub healthy: bool,
}

/// `GET /v1/health`
///
/// 200 while the task store answers, 503 otherwise. Without the store no
/// intent can be admitted.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let store = state.coordinator.store();
    let healthy = match store.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            error!(error = %e, "Task store health check failed");
            false
        }
    };
    debug!(provider = store.provider_name(), healthy = healthy, "Health check");

    let body = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" },
        timestamp: Utc::now().to_rfc3339(),
        uptime: state.uptime().as_secs_f64(),
        environment: state.environment.clone(),
        version: env!("CARGO_PKG_VERSION"),
        store: StoreHealth {
            provider: store.provider_name(),
            healthy,
        },
        active_units: state.coordinator.active_units(),
    };

    if healthy {
        ApiResponse::new("Service is healthy", body).with_status(StatusCode::OK)
    } else {
        ApiResponse::new("Service is degraded", body).with_status(StatusCode::SERVICE_UNAVAILABLE)
    }
}
