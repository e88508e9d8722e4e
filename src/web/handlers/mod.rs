//! Request handlers

pub mod health;
pub mod webhook;

use axum::http::Uri;
use tracing::warn;

use crate::web::errors::ApiError;

/// Fallback for unmatched routes
pub async fn not_found(uri: Uri) -> ApiError {
    warn!(path = %uri.path(), "404 - Route not found");
    ApiError::not_found(
        format!("Route {} not found", uri.path()),
        "The requested endpoint does not exist",
    )
}
