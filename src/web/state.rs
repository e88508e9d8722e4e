//! Shared state for request handlers

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::orchestration::Coordinator;

#[derive(Debug)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
    pub environment: String,
    pub request_timeout: Duration,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        coordinator: Arc<Coordinator>,
        environment: impl Into<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            coordinator,
            environment: environment.into(),
            request_timeout,
            started_at: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
