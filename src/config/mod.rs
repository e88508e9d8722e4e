//! # Service Configuration
//!
//! Typed configuration for every component of the service. Values are
//! layered by [`ConfigLoader`]: built-in defaults, then
//! `config/default.toml`, then `config/<environment>.toml`, then
//! `STATEHOOK__SECTION__KEY` environment variables.
//!
//! Every section implements `Default`, so a missing file or a partial file
//! is never an error. [`AppConfig::validate`] runs after merging.

pub mod error;
pub mod loader;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Upper bound for either store TTL (seven days)
pub const MAX_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub execution: ExecutionConfig,
    pub openstack: OpenStackConfig,
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Task store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redis,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub redis_url: String,
    pub key_prefix: String,
    /// Lifetime of a PROCESSING record; bounds how long a crashed unit blocks its target
    pub processing_ttl_seconds: u64,
    /// Lifetime of a COMPLETED/FAILED record
    pub terminal_ttl_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Redis,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "worker:server".to_string(),
            processing_ttl_seconds: 600,
            terminal_ttl_seconds: 300,
        }
    }
}

impl StoreConfig {
    pub fn processing_ttl(&self) -> Duration {
        Duration::from_secs(self.processing_ttl_seconds)
    }

    pub fn terminal_ttl(&self) -> Duration {
        Duration::from_secs(self.terminal_ttl_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub max_poll_attempts: u32,
    pub poll_interval_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_poll_attempts: 30,
            poll_interval_ms: 10_000,
        }
    }
}

impl ExecutionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Upper bound on time spent confirming a transition
    pub fn poll_budget(&self) -> Duration {
        self.poll_interval().saturating_mul(self.max_poll_attempts)
    }
}

/// Identity and endpoints for the OpenStack control plane
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenStackConfig {
    pub auth_url: String,
    pub compute_base_url: String,
    pub username: String,
    pub password: String,
    pub user_domain: String,
    pub project_name: String,
    pub request_timeout_ms: u64,
}

impl fmt::Debug for OpenStackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenStackConfig")
            .field("auth_url", &self.auth_url)
            .field("compute_base_url", &self.compute_base_url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("user_domain", &self.user_domain)
            .field("project_name", &self.project_name)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

impl Default for OpenStackConfig {
    fn default() -> Self {
        Self {
            auth_url: String::new(),
            compute_base_url: String::new(),
            username: String::new(),
            password: String::new(),
            user_domain: "Default".to_string(),
            project_name: String::new(),
            request_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub enabled: bool,
    pub webhook_url: Option<String>,
    pub timeout_ms: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_url: None,
            timeout_ms: 5_000,
        }
    }
}

impl AppConfig {
    /// Reject settings that would make the single-flight guarantees unsound
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.bind_address.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "bind_address",
                "server",
            ));
        }

        if self.execution.max_poll_attempts == 0 {
            return Err(ConfigurationError::invalid_value(
                "execution.max_poll_attempts",
                self.execution.max_poll_attempts,
                "must be greater than zero",
            ));
        }

        if self.execution.poll_interval_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "execution.poll_interval_ms",
                self.execution.poll_interval_ms,
                "must be greater than zero",
            ));
        }

        if self.store.key_prefix.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "key_prefix",
                "store",
            ));
        }

        for (field, seconds) in [
            ("store.processing_ttl_seconds", self.store.processing_ttl_seconds),
            ("store.terminal_ttl_seconds", self.store.terminal_ttl_seconds),
        ] {
            if seconds == 0 || seconds > MAX_TTL_SECONDS {
                return Err(ConfigurationError::invalid_value(
                    field,
                    seconds,
                    format!("must be between 1 and {MAX_TTL_SECONDS} seconds"),
                ));
            }
        }

        if self.store.terminal_ttl_seconds > self.store.processing_ttl_seconds {
            return Err(ConfigurationError::validation_error(format!(
                "store.terminal_ttl_seconds ({}) must not exceed store.processing_ttl_seconds ({})",
                self.store.terminal_ttl_seconds, self.store.processing_ttl_seconds
            )));
        }

        if self.store.processing_ttl() < self.execution.poll_budget() {
            return Err(ConfigurationError::validation_error(format!(
                "store.processing_ttl_seconds ({}) is shorter than the poll budget ({}s); the lock would expire while a unit is still polling",
                self.store.processing_ttl_seconds,
                self.execution.poll_budget().as_secs()
            )));
        }

        let has_webhook = matches!(
            self.notifications.webhook_url.as_deref(),
            Some(url) if !url.trim().is_empty()
        );
        if self.notifications.enabled && !has_webhook {
            return Err(ConfigurationError::missing_required_field(
                "webhook_url",
                "notifications (enabled = true)",
            ));
        }

        Ok(())
    }
}
