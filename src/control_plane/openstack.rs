//! # OpenStack Control-Plane Client
//!
//! Keystone v3 password authentication plus the handful of Nova compute
//! endpoints the execution unit needs:
//!
//! - `POST {auth_url}/v3/auth/tokens?nocatalog` - token from `X-Subject-Token`
//! - `GET  {compute}/servers/detail`
//! - `GET  {compute}/servers/{id}`
//! - `POST {compute}/servers/{id}/action` - `{"os-start": null}` / `{"os-stop": null}`

use super::errors::{ControlPlaneError, ControlPlaneResult};
use super::{AuthToken, ControlPlane};
use crate::config::OpenStackConfig;
use crate::models::{InstanceObservation, TargetState};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info};

const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

#[derive(Debug, Deserialize)]
struct ServerRecord {
    id: String,
    name: String,
    status: String,
}

impl From<ServerRecord> for InstanceObservation {
    fn from(record: ServerRecord) -> Self {
        InstanceObservation {
            id: record.id,
            name: record.name,
            status: record.status,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ServersDetailResponse {
    servers: Vec<ServerRecord>,
}

#[derive(Debug, Deserialize)]
struct ServerResponse {
    server: ServerRecord,
}

/// HTTP client for Keystone and Nova
#[derive(Clone)]
pub struct OpenStackClient {
    client: Client,
    config: OpenStackConfig,
}

impl std::fmt::Debug for OpenStackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenStackClient")
            .field("auth_url", &self.config.auth_url)
            .field("compute_base_url", &self.config.compute_base_url)
            .field("username", &self.config.username)
            .finish()
    }
}

impl OpenStackClient {
    pub fn new(config: OpenStackConfig) -> ControlPlaneResult<Self> {
        if config.auth_url.is_empty() || config.compute_base_url.is_empty() {
            return Err(ControlPlaneError::ConfigError(
                "openstack.auth_url and openstack.compute_base_url are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(format!("statehook/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ControlPlaneError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        info!(
            auth_url = %config.auth_url,
            compute_base_url = %config.compute_base_url,
            timeout_ms = config.request_timeout_ms,
            "Created OpenStack control-plane client"
        );

        Ok(Self { client, config })
    }

    fn auth_endpoint(&self) -> String {
        format!("{}/v3/auth/tokens", self.config.auth_url.trim_end_matches('/'))
    }

    fn compute_endpoint(&self, path: &str) -> String {
        format!(
            "{}{}",
            self.config.compute_base_url.trim_end_matches('/'),
            path
        )
    }

    fn auth_body(&self) -> Value {
        json!({
            "auth": {
                "identity": {
                    "methods": ["password"],
                    "password": {
                        "user": {
                            "domain": { "name": self.config.user_domain },
                            "name": self.config.username,
                            "password": self.config.password,
                        }
                    }
                },
                "scope": {
                    "project": {
                        "domain": { "name": self.config.user_domain },
                        "name": self.config.project_name,
                    }
                }
            }
        })
    }

    /// Pass 2xx responses through, classify everything else
    async fn ensure_success(response: Response, context: &str) -> ControlPlaneResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!(status = %status, error = %body, context = context, "Control plane request failed");
        Err(ControlPlaneError::from_status(
            status.as_u16(),
            format!("{}: HTTP {}: {}", context, status, body),
        ))
    }
}

#[async_trait]
impl ControlPlane for OpenStackClient {
    async fn authenticate(&self) -> ControlPlaneResult<AuthToken> {
        let url = self.auth_endpoint();
        debug!(url = %url, username = %self.config.username, "Authenticating with Keystone");

        let response = self
            .client
            .post(&url)
            .query(&[("nocatalog", "")])
            .json(&self.auth_body())
            .send()
            .await?;

        let response = Self::ensure_success(response, "authenticate")
            .await
            .map_err(|e| match e {
                ControlPlaneError::HttpError(_) | ControlPlaneError::AuthFailed(_) => e,
                other => ControlPlaneError::AuthFailed(other.to_string()),
            })?;

        let token = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                ControlPlaneError::AuthFailed(format!(
                    "Keystone response carried no {} header",
                    SUBJECT_TOKEN_HEADER
                ))
            })?;

        debug!("Keystone authentication succeeded");
        Ok(AuthToken::new(token))
    }

    async fn list_instances(
        &self,
        token: &AuthToken,
    ) -> ControlPlaneResult<Vec<InstanceObservation>> {
        let url = self.compute_endpoint("/servers/detail");
        let response = self
            .client
            .get(&url)
            .header(AUTH_TOKEN_HEADER, token.expose())
            .send()
            .await?;
        let response = Self::ensure_success(response, "list servers").await?;

        let body: ServersDetailResponse = response.json().await.map_err(|e| {
            ControlPlaneError::InvalidResponse(format!("servers/detail: {}", e))
        })?;

        let instances: Vec<InstanceObservation> =
            body.servers.into_iter().map(InstanceObservation::from).collect();
        info!(server_count = instances.len(), "Retrieved servers");
        Ok(instances)
    }

    async fn get_instance(
        &self,
        token: &AuthToken,
        instance_id: &str,
    ) -> ControlPlaneResult<InstanceObservation> {
        let url = self.compute_endpoint(&format!("/servers/{}", instance_id));
        let response = self
            .client
            .get(&url)
            .header(AUTH_TOKEN_HEADER, token.expose())
            .send()
            .await?;
        let response = Self::ensure_success(response, "get server").await?;

        let body: ServerResponse = response
            .json()
            .await
            .map_err(|e| ControlPlaneError::InvalidResponse(format!("servers/{{id}}: {}", e)))?;

        debug!(
            server_id = %body.server.id,
            name = %body.server.name,
            status = %body.server.status,
            "Retrieved server details"
        );
        Ok(body.server.into())
    }

    async fn request_transition(
        &self,
        token: &AuthToken,
        instance_id: &str,
        target: TargetState,
    ) -> ControlPlaneResult<()> {
        let action = action_name(target);
        let url = self.compute_endpoint(&format!("/servers/{}/action", instance_id));

        let mut body = serde_json::Map::new();
        body.insert(action.to_string(), Value::Null);

        info!(server_id = instance_id, action = action, "Sending server action");

        let response = self
            .client
            .post(&url)
            .header(AUTH_TOKEN_HEADER, token.expose())
            .json(&body)
            .send()
            .await?;
        let response = Self::ensure_success(response, action).await?;

        info!(
            server_id = instance_id,
            action = action,
            status = %response.status(),
            "Server action accepted"
        );
        Ok(())
    }
}

/// Nova server action for a target state
fn action_name(target: TargetState) -> &'static str {
    match target {
        TargetState::Up => "os-start",
        TargetState::Down => "os-stop",
    }
}
