//! Configuration Loader
//!
//! Environment-aware layered loading. Sources, lowest precedence first:
//!
//! 1. Built-in defaults ([`AppConfig::default`])
//! 2. `<config_dir>/default.toml` (optional)
//! 3. `<config_dir>/<environment>.toml` (optional)
//! 4. `STATEHOOK__SECTION__KEY` environment variables
//!
//! The merged result is validated before it is returned.

use super::error::ConfigResult;
use super::AppConfig;
use config::{Config, Environment, File};
use serde_json::Value;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const ENV_PREFIX: &str = "STATEHOOK";
const ENV_SEPARATOR: &str = "__";
const SENSITIVE_PATTERNS: [&str; 4] = ["password", "secret", "token", "webhook_url"];

/// Loads [`AppConfig`] for a given environment from a config directory
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_directory: PathBuf,
    environment: String,
}

impl ConfigLoader {
    pub fn new(config_directory: impl Into<PathBuf>, environment: impl Into<String>) -> Self {
        Self {
            config_directory: config_directory.into(),
            environment: environment.into(),
        }
    }

    /// Loader for `./config` and the detected environment
    pub fn from_environment() -> Self {
        let config_directory = env::var("STATEHOOK_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));
        Self::new(config_directory, Self::detect_environment())
    }

    /// `STATEHOOK_ENV`, then `APP_ENV`, then "development"
    pub fn detect_environment() -> String {
        env::var("STATEHOOK_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Merge all sources, deserialize and validate
    pub fn load(&self) -> ConfigResult<AppConfig> {
        let default_file = self.config_directory.join("default.toml");
        let environment_file = self
            .config_directory
            .join(format!("{}.toml", self.environment));

        debug!(
            environment = %self.environment,
            config_directory = %self.config_directory.display(),
            "Loading configuration"
        );

        let config: AppConfig = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::from(default_file).required(false))
            .add_source(File::from(environment_file).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;

        debug!(
            "Configuration loaded: {}",
            serde_json::to_string_pretty(&Self::sanitize_config_for_logging(&config))
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );
        info!(
            environment = %self.environment,
            bind_address = %config.server.bind_address,
            store_backend = ?config.store.backend,
            max_poll_attempts = config.execution.max_poll_attempts,
            poll_interval_ms = config.execution.poll_interval_ms,
            notifications_enabled = config.notifications.enabled,
            "⚙️ CONFIG: Configuration loaded successfully"
        );

        Ok(config)
    }

    /// JSON view of the configuration with credentials masked
    pub fn sanitize_config_for_logging(config: &AppConfig) -> Value {
        let mut value = serde_json::to_value(config).unwrap_or(Value::Null);
        Self::sanitize_json_recursive(&mut value);
        value
    }

    fn sanitize_json_recursive(value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    let is_sensitive = SENSITIVE_PATTERNS
                        .iter()
                        .any(|pattern| key_lower.contains(pattern));

                    if is_sensitive {
                        if let Value::String(s) = val {
                            if !s.is_empty() {
                                *val = Value::String("***REDACTED***".to_string());
                            }
                        }
                    } else {
                        Self::sanitize_json_recursive(val);
                    }
                }
            }
            Value::Array(items) => items.iter_mut().for_each(Self::sanitize_json_recursive),
            _ => {}
        }
    }
}
