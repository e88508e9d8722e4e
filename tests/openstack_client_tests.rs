//! OpenStack client against an in-process fake of the Keystone and Nova endpoints

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

use statehook::config::OpenStackConfig;
use statehook::control_plane::{AuthToken, ControlPlane, ControlPlaneError, OpenStackClient};
use statehook::models::TargetState;

const TOKEN: &str = "gAAAAB-fake-token";

#[derive(Default)]
struct FakeCloud {
    actions: Mutex<Vec<(String, Value)>>,
}

async fn issue_token(Json(body): Json<Value>) -> Response {
    let user = &body["auth"]["identity"]["password"]["user"];
    match (user["name"].as_str(), user["password"].as_str()) {
        (Some("admin"), Some("secret")) => (
            StatusCode::CREATED,
            [("x-subject-token", TOKEN)],
            Json(json!({ "token": { "methods": ["password"] } })),
        )
            .into_response(),
        (Some("tokenless"), _) => (StatusCode::CREATED, Json(json!({ "token": {} }))).into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "message": "The request you have made requires authentication." } })),
        )
            .into_response(),
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("x-auth-token")
        .and_then(|value| value.to_str().ok())
        == Some(TOKEN)
}

async fn list_servers(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({
        "servers": [
            { "id": "id-1", "name": "vm-1", "status": "SHUTOFF", "flavor": { "id": "m1.small" } },
            { "id": "id-2", "name": "vm-2", "status": "ACTIVE" }
        ]
    }))
    .into_response()
}

async fn show_server(headers: HeaderMap, Path(server_id): Path<String>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match server_id.as_str() {
        "id-1" => Json(json!({ "server": { "id": "id-1", "name": "vm-1", "status": "ACTIVE" } }))
            .into_response(),
        "garbled" => Json(json!({ "servers": [] })).into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "itemNotFound": { "code": 404, "message": "Instance could not be found" } })),
        )
            .into_response(),
    }
}

async fn server_action(
    State(cloud): State<Arc<FakeCloud>>,
    headers: HeaderMap,
    Path(server_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    cloud.actions.lock().push((server_id.clone(), body));
    match server_id.as_str() {
        "busy" => (
            StatusCode::CONFLICT,
            Json(json!({ "conflictingRequest": { "code": 409, "message": "Cannot 'start' instance while it is in vm_state active" } })),
        )
            .into_response(),
        "broken" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => StatusCode::ACCEPTED.into_response(),
    }
}

async fn start_fake_cloud() -> (SocketAddr, Arc<FakeCloud>) {
    let cloud = Arc::new(FakeCloud::default());
    let app = Router::new()
        .route("/v3/auth/tokens", post(issue_token))
        .route("/servers/detail", get(list_servers))
        .route("/servers/{server_id}", get(show_server))
        .route("/servers/{server_id}/action", post(server_action))
        .with_state(cloud.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake cloud");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    (addr, cloud)
}

fn client_for(addr: SocketAddr, username: &str) -> OpenStackClient {
    OpenStackClient::new(OpenStackConfig {
        auth_url: format!("http://{addr}/"),
        compute_base_url: format!("http://{addr}"),
        username: username.to_string(),
        password: "secret".to_string(),
        user_domain: "Default".to_string(),
        project_name: "ops".to_string(),
        request_timeout_ms: 2_000,
    })
    .expect("client builds")
}

#[tokio::test]
async fn test_authenticate_reads_subject_token_header() {
    let (addr, _) = start_fake_cloud().await;
    let client = client_for(addr, "admin");

    let token = client.authenticate().await.expect("token issued");

    assert_eq!(token.expose(), TOKEN);
}

#[tokio::test]
async fn test_rejected_credentials_are_auth_failures() {
    let (addr, _) = start_fake_cloud().await;
    let client = client_for(addr, "intruder");

    let err = client.authenticate().await.unwrap_err();

    assert!(matches!(err, ControlPlaneError::AuthFailed(_)));
}

#[tokio::test]
async fn test_missing_token_header_is_auth_failure() {
    let (addr, _) = start_fake_cloud().await;
    let client = client_for(addr, "tokenless");

    let err = client.authenticate().await.unwrap_err();

    match err {
        ControlPlaneError::AuthFailed(message) => assert!(message.contains("X-Subject-Token")),
        other => panic!("expected AuthFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_and_get_instances() {
    let (addr, _) = start_fake_cloud().await;
    let client = client_for(addr, "admin");
    let token = client.authenticate().await.unwrap();

    let instances = client.list_instances(&token).await.unwrap();
    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0].id, "id-1");
    assert_eq!(instances[0].name, "vm-1");
    assert_eq!(instances[0].status, "SHUTOFF");

    let observed = client.get_instance(&token, "id-1").await.unwrap();
    assert_eq!(observed.status, "ACTIVE");
}

#[tokio::test]
async fn test_get_missing_instance_is_not_found() {
    let (addr, _) = start_fake_cloud().await;
    let client = client_for(addr, "admin");
    let token = client.authenticate().await.unwrap();

    let err = client.get_instance(&token, "gone").await.unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_unexpected_body_is_invalid_response() {
    let (addr, _) = start_fake_cloud().await;
    let client = client_for(addr, "admin");
    let token = client.authenticate().await.unwrap();

    let err = client.get_instance(&token, "garbled").await.unwrap_err();

    assert!(matches!(err, ControlPlaneError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_stale_token_is_auth_failure() {
    let (addr, _) = start_fake_cloud().await;
    let client = client_for(addr, "admin");

    let err = client
        .list_instances(&AuthToken::new("expired"))
        .await
        .unwrap_err();

    assert!(matches!(err, ControlPlaneError::AuthFailed(_)));
}

#[tokio::test]
async fn test_transition_posts_server_action() {
    let (addr, cloud) = start_fake_cloud().await;
    let client = client_for(addr, "admin");
    let token = client.authenticate().await.unwrap();

    client
        .request_transition(&token, "id-1", TargetState::Up)
        .await
        .unwrap();
    client
        .request_transition(&token, "id-1", TargetState::Down)
        .await
        .unwrap();

    let actions = cloud.actions.lock().clone();
    assert_eq!(
        actions,
        vec![
            ("id-1".to_string(), json!({ "os-start": null })),
            ("id-1".to_string(), json!({ "os-stop": null })),
        ]
    );
}

#[tokio::test]
async fn test_transition_errors_are_classified() {
    let (addr, _) = start_fake_cloud().await;
    let client = client_for(addr, "admin");
    let token = client.authenticate().await.unwrap();

    let conflict = client
        .request_transition(&token, "busy", TargetState::Up)
        .await
        .unwrap_err();
    assert!(conflict.is_conflict());

    let server_error = client
        .request_transition(&token, "broken", TargetState::Up)
        .await
        .unwrap_err();
    assert!(matches!(
        server_error,
        ControlPlaneError::ApiError { status: 500, .. }
    ));
}
