//! Integration tests for tern-daytona.
//!
//! These run the real HTTP client against an in-process fake of the Daytona
//! control plane and toolbox, served by axum on a loopback port.

use axum::extract::{Path, Query, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tern_daytona::{
    CreateSandboxRequest, DaytonaClient, DaytonaConfig, DaytonaError, SandboxApi, SandboxState,
    SessionExecRequest,
};

const API_KEY: &str = "test-key";

/// Variables exported in one session.
type ShellEnv = HashMap<String, String>;

#[derive(Default)]
struct FakeDaytona {
    sandboxes: HashMap<String, Value>,
    /// sandbox id -> session id -> exported variables
    sessions: HashMap<String, HashMap<String, ShellEnv>>,
    commands: Vec<(String, String, Value)>,
    next_id: u32,
}

type Shared = Arc<Mutex<FakeDaytona>>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {API_KEY}"))
        .unwrap_or(false)
}

fn error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({"statusCode": status.as_u16(), "message": message})),
    )
        .into_response()
}

async fn create_sandbox(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Invalid API key");
    }
    let mut fake = state.lock().unwrap();
    fake.next_id += 1;
    let id = format!("sb-{}", fake.next_id);
    let sandbox = json!({
        "id": id,
        "state": "started",
        "labels": body.get("labels").cloned().unwrap_or_else(|| json!({})),
        "target": body.get("target").cloned().unwrap_or(Value::Null),
        "public": body.get("public").cloned().unwrap_or(json!(false)),
        "cpu": body["cpu"],
        "memory": body["memory"],
        "disk": body["disk"],
        "env": body.get("env").cloned().unwrap_or_else(|| json!({})),
    });
    fake.sandboxes.insert(id, sandbox.clone());
    (StatusCode::OK, Json(sandbox)).into_response()
}

async fn list_sandboxes(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let wanted: HashMap<String, String> = query
        .get("labels")
        .and_then(|l| serde_json::from_str(l).ok())
        .unwrap_or_default();
    let fake = state.lock().unwrap();
    let matches: Vec<Value> = fake
        .sandboxes
        .values()
        .filter(|sb| {
            wanted
                .iter()
                .all(|(k, v)| sb["labels"].get(k).and_then(|x| x.as_str()) == Some(v.as_str()))
        })
        .cloned()
        .collect();
    Json(Value::Array(matches)).into_response()
}

async fn get_sandbox(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let fake = state.lock().unwrap();
    match fake.sandboxes.get(&id) {
        Some(sb) => Json(sb.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Sandbox not found"),
    }
}

async fn delete_sandbox(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut fake = state.lock().unwrap();
    match fake.sandboxes.remove(&id) {
        Some(_) => StatusCode::OK.into_response(),
        None => error(StatusCode::NOT_FOUND, "Sandbox not found"),
    }
}

async fn start_sandbox(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut fake = state.lock().unwrap();
    match fake.sandboxes.get_mut(&id) {
        Some(sb) => {
            sb["state"] = json!("started");
            Json(sb.clone()).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Sandbox not found"),
    }
}

async fn create_session(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut fake = state.lock().unwrap();
    if !fake.sandboxes.contains_key(&id) {
        return error(StatusCode::NOT_FOUND, "Sandbox not found");
    }
    let session = body["sessionId"].as_str().unwrap_or_default().to_string();
    let sessions = fake.sessions.entry(id).or_default();
    if sessions.contains_key(&session) {
        return error(StatusCode::CONFLICT, "session already exists");
    }
    sessions.insert(session, ShellEnv::new());
    StatusCode::CREATED.into_response()
}

/// Just enough shell for `export K=V` and `echo $K` to share state.
fn run_in_session(env: &mut ShellEnv, command: &str) -> String {
    if let Some(assignment) = command.strip_prefix("export ") {
        if let Some((key, value)) = assignment.split_once('=') {
            env.insert(key.to_string(), value.to_string());
        }
        return String::new();
    }
    if let Some(var) = command.strip_prefix("echo $") {
        return format!("{}\n", env.get(var).cloned().unwrap_or_default());
    }
    format!("ran: {command}\n")
}

async fn exec_session(
    State(state): State<Shared>,
    Path((id, session)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let mut fake = state.lock().unwrap();
    let known = fake
        .sessions
        .get(&id)
        .map(|s| s.contains_key(&session))
        .unwrap_or(false);
    if !known {
        return error(StatusCode::NOT_FOUND, "session not found");
    }
    fake.commands.push((id.clone(), session.clone(), body.clone()));
    let cmd_id = format!("cmd-{}", fake.commands.len());
    if body["runAsync"].as_bool().unwrap_or(false) {
        return Json(json!({ "cmdId": cmd_id })).into_response();
    }
    let command = body["command"].as_str().unwrap_or_default();
    let env = fake
        .sessions
        .get_mut(&id)
        .and_then(|s| s.get_mut(&session))
        .expect("session checked above");
    let output = run_in_session(env, command);
    Json(json!({
        "cmdId": cmd_id,
        "output": output,
        "exitCode": 0
    }))
    .into_response()
}

async fn spawn_fake() -> (String, Shared) {
    let state: Shared = Arc::default();
    let router = Router::new()
        .route("/api/sandbox", post(create_sandbox).get(list_sandboxes))
        .route("/api/sandbox/:id", get(get_sandbox).delete(delete_sandbox))
        .route("/api/sandbox/:id/start", post(start_sandbox))
        .route(
            "/api/toolbox/:id/toolbox/process/session",
            post(create_session),
        )
        .route(
            "/api/toolbox/:id/toolbox/process/session/:session/exec",
            post(exec_session),
        )
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}/api"), state)
}

fn client_for(url: &str, key: &str) -> DaytonaClient {
    DaytonaClient::new(DaytonaConfig::new(key, url, "us")).expect("valid config")
}

#[test]
fn test_client_validates_and_keeps_config() {
    let err = DaytonaClient::new(DaytonaConfig::new("", "https://x.example", "us")).unwrap_err();
    assert!(matches!(err, DaytonaError::Config(_)));

    let client = client_for("https://daytona.example.com/api/", API_KEY);
    assert_eq!(client.config().server_url, "https://daytona.example.com/api/");
    assert_eq!(client.config().target, "us");
    assert!(!format!("{:?}", client.config()).contains(API_KEY));
}

#[tokio::test]
async fn test_create_fetch_and_restart() {
    let (url, state) = spawn_fake().await;
    let client = client_for(&url, API_KEY);

    let request = CreateSandboxRequest::builder("kortix/suna:0.1.3")
        .public(true)
        .target("us")
        .label("id", "project-1")
        .env("VNC_PASSWORD", "pw")
        .build()
        .unwrap();
    let sandbox = client.create_sandbox(&request).await.unwrap();
    assert_eq!(sandbox.state, SandboxState::Started);
    assert_eq!(sandbox.labels["id"], "project-1");
    assert_eq!(sandbox.cpu, Some(2));

    {
        let fake = state.lock().unwrap();
        let stored = &fake.sandboxes[&sandbox.id];
        assert_eq!(stored["env"]["VNC_PASSWORD"], "pw");
    }

    // Simulate the control plane stopping the sandbox behind our back
    state.lock().unwrap().sandboxes.get_mut(&sandbox.id).unwrap()["state"] = json!("stopped");
    let fetched = client.get_sandbox(&sandbox.id).await.unwrap();
    assert_eq!(fetched.state, SandboxState::Stopped);

    let started = client.start_sandbox(&sandbox.id).await.unwrap();
    assert_eq!(started.state, SandboxState::Started);
}

#[tokio::test]
async fn test_get_unknown_sandbox_is_not_found() {
    let (url, _state) = spawn_fake().await;
    let client = client_for(&url, API_KEY);

    let err = client.get_sandbox("missing").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[tokio::test]
async fn test_session_creation_is_idempotent() {
    let (url, state) = spawn_fake().await;
    let client = client_for(&url, API_KEY);
    let request = CreateSandboxRequest::builder("img").build().unwrap();
    let sandbox = client.create_sandbox(&request).await.unwrap();

    client.create_session(&sandbox.id, "default").await.unwrap();
    client
        .create_session(&sandbox.id, "default")
        .await
        .expect("second create must not fail");

    assert_eq!(state.lock().unwrap().sessions[&sandbox.id].len(), 1);
}

#[tokio::test]
async fn test_exec_sync_and_async() {
    let (url, state) = spawn_fake().await;
    let client = client_for(&url, API_KEY);
    let request = CreateSandboxRequest::builder("img").build().unwrap();
    let sandbox = client.create_sandbox(&request).await.unwrap();
    client.create_session(&sandbox.id, "default").await.unwrap();

    let sync = client
        .execute_session_command(&sandbox.id, "default", &SessionExecRequest::new("echo hi"))
        .await
        .unwrap();
    assert_eq!(sync.exit_code, Some(0));
    assert_eq!(sync.output.as_deref(), Some("ran: echo hi\n"));

    let submitted = client
        .execute_session_command(
            &sandbox.id,
            "default",
            &SessionExecRequest::new("sleep 60").run_async(true),
        )
        .await
        .unwrap();
    assert!(submitted.cmd_id.is_some());
    assert!(submitted.exit_code.is_none());

    let fake = state.lock().unwrap();
    let commands: Vec<&str> = fake
        .commands
        .iter()
        .map(|(_, _, body)| body["command"].as_str().unwrap())
        .collect();
    assert_eq!(commands, vec!["echo hi", "sleep 60"]);
}

#[tokio::test]
async fn test_session_shell_state_is_per_session() {
    let (url, _state) = spawn_fake().await;
    let client = client_for(&url, API_KEY);
    let request = CreateSandboxRequest::builder("img").build().unwrap();
    let sandbox = client.create_sandbox(&request).await.unwrap();
    for session in ["default", "other"] {
        client.create_session(&sandbox.id, session).await.unwrap();
    }

    client
        .execute_session_command(&sandbox.id, "default", &SessionExecRequest::new("export STAGE=build"))
        .await
        .unwrap();
    let same = client
        .execute_session_command(&sandbox.id, "default", &SessionExecRequest::new("echo $STAGE"))
        .await
        .unwrap();
    assert_eq!(same.output.as_deref(), Some("build\n"));

    let other = client
        .execute_session_command(&sandbox.id, "other", &SessionExecRequest::new("echo $STAGE"))
        .await
        .unwrap();
    assert_eq!(other.output.as_deref(), Some("\n"));
}

#[tokio::test]
async fn test_list_by_label() {
    let (url, _state) = spawn_fake().await;
    let client = client_for(&url, API_KEY);

    for project in ["p-1", "p-2"] {
        let request = CreateSandboxRequest::builder("img")
            .label("id", project)
            .build()
            .unwrap();
        client.create_sandbox(&request).await.unwrap();
    }

    let labels = HashMap::from([("id".to_string(), "p-2".to_string())]);
    let found = client.list_sandboxes(&labels).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].labels["id"], "p-2");
}

#[tokio::test]
async fn test_delete_sandbox() {
    let (url, _state) = spawn_fake().await;
    let client = client_for(&url, API_KEY);
    let request = CreateSandboxRequest::builder("img").build().unwrap();
    let sandbox = client.create_sandbox(&request).await.unwrap();

    client.delete_sandbox(&sandbox.id).await.unwrap();
    assert!(client.get_sandbox(&sandbox.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_bad_api_key_surfaces_status() {
    let (url, _state) = spawn_fake().await;
    let client = client_for(&url, "wrong-key");
    let request = CreateSandboxRequest::builder("img").build().unwrap();

    match client.create_sandbox(&request).await {
        Err(DaytonaError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid API key");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}
