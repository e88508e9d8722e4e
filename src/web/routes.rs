//! Route definitions

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::web::{handlers, state::AppState};

/// State-change webhook and task status
pub fn webhook_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/v1/webhooks/servers/{server_name}/states",
        get(handlers::webhook::get_server_state).put(handlers::webhook::update_server_state),
    )
}

pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/v1/health", get(handlers::health::health_check))
}
