//! End-to-end route tests against an in-memory store.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode, header};
use credgate::{AppState, ServerConfig, router};
use credgate_core::{CredentialGateway, PasswordHasher, StoreConfig, TlsMode, UserRepository};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app_with(debug_endpoints: bool) -> Router {
    let repo = UserRepository::in_memory().await.unwrap();
    let gateway =
        CredentialGateway::new(repo).with_hasher(PasswordHasher::with_cost(1024, 1, 1).unwrap());
    let config = ServerConfig {
        debug_endpoints,
        ..ServerConfig::default()
    };
    router(AppState::new(gateway, config))
}

async fn app() -> Router {
    app_with(false).await
}

fn unreachable_app() -> Router {
    let store = StoreConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        tls: TlsMode::Disabled,
        ..StoreConfig::default()
    }
    .connect_timeout(Duration::from_millis(200));
    let repo = UserRepository::connect_lazy(&store).unwrap();
    let config = ServerConfig {
        store,
        ..ServerConfig::default()
    };
    router(AppState::new(CredentialGateway::new(repo), config))
}

fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_from(uri: &str, peer: &str) -> Request<Body> {
    let mut request = Request::get(uri).body(Body::empty()).unwrap();
    let peer: SocketAddr = peer.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    request
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn send_html(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let (status, body) = send(app, request).await;
    (status, String::from_utf8(body).unwrap())
}

#[tokio::test]
async fn api_register_then_login() {
    let app = app().await;

    let (status, body) = send_json(
        &app,
        json_request(
            "/api/register",
            &json!({"username": "alice", "password": "s3cret", "email": "alice@example.com"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Registration successful! Welcome, alice!");
    assert!(body["user_id"].as_i64().unwrap() > 0);

    let (status, body) = send_json(
        &app,
        json_request("/api/login", &json!({"username": "alice", "password": "s3cret"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user_data"]["username"], "alice");
    assert_eq!(body["user_data"]["email"], "alice@example.com");
    assert_eq!(body["matched_by"], "exact");
    assert!(body["user_data"].get("password_hash").is_none());
}

#[tokio::test]
async fn api_duplicates_are_conflicts() {
    let app = app().await;
    let first = json!({"username": "carol", "password": "pw", "phone": "555-0100"});
    let (status, _) = send_json(&app, json_request("/api/register", &first)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        &app,
        json_request("/api/register", &json!({"username": "carol", "password": "other"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Username already exists");

    let (status, body) = send_json(
        &app,
        json_request(
            "/api/register",
            &json!({"username": "dave", "password": "pw", "phone": "555-0100"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Phone number already exists");
}

#[tokio::test]
async fn api_login_case_fallback_and_failures() {
    let app = app().await;
    send_json(
        &app,
        json_request(
            "/api/register",
            &json!({"username": "bob", "password": "hunter2", "email": "", "phone": ""}),
        ),
    )
    .await;

    let (status, body) = send_json(
        &app,
        json_request("/api/login", &json!({"username": "BOB", "password": "hunter2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matched_by"], "case_insensitive");

    let (status, body) = send_json(
        &app,
        json_request("/api/login", &json!({"username": "bob", "password": "wrongpass"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, _) = send_json(
        &app,
        json_request(
            "/api/login",
            &json!({"username": "bob", "password": "hunter2", "email": "bob@example.com"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn api_rejects_bad_bodies() {
    let app = app().await;

    let request = Request::post("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No JSON data provided");

    let request = Request::post("/api/register").body(Body::empty()).unwrap();
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No JSON data provided");

    let (status, body) = send_json(
        &app,
        json_request("/api/register", &json!({"username": "  ", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username and password required");

    let (status, body) = send_json(
        &app,
        json_request("/api/login", &json!({"username": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username and password required");
}

#[tokio::test]
async fn form_flow_renders_html() {
    let app = app().await;

    let (status, page) = send_html(&app, Request::get("/").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains(r#"action="/register""#));

    let (status, page) = send_html(
        &app,
        form_request("/register", "username=erin&password=pw&email=&phone=555-0199&role=admin"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("Registration successful! Welcome, erin!"));

    let (status, page) = send_html(&app, form_request("/login", "username=Erin&password=pw")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("Login successful! Welcome back, erin!"));
    assert!(page.contains("555-0199"));
    assert!(page.contains("<th>Role</th><td>admin</td>"));

    let (status, page) = send_html(&app, form_request("/login", "username=erin&password=nope")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(page.contains("Invalid credentials"));

    let (status, page) = send_html(&app, form_request("/register", "username=erin&password=x")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(page.contains("Username already exists"));
}

#[tokio::test]
async fn form_escapes_user_input() {
    let app = app().await;
    let (status, page) = send_html(
        &app,
        form_request("/register", "username=%3Cscript%3E&password=pw"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("&lt;script&gt;"));
    assert!(!page.contains("Welcome, <script>"));
}

#[tokio::test]
async fn health_reports_count() {
    let app = app().await;
    send_json(
        &app,
        json_request("/api/register", &json!({"username": "frank", "password": "pw"})),
    )
    .await;

    let (status, body) =
        send_json(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["users_count"], 1);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn unreachable_store() {
    let app = unreachable_app();

    let (status, body) =
        send_json(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["database"], "disconnected");

    let (status, body) = send_json(
        &app,
        json_request("/api/login", &json!({"username": "a", "password": "b"})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "Database connection failed");
}

#[tokio::test]
async fn debug_is_absent_by_default() {
    let app = app().await;
    let (status, body) = send_json(&app, get_from("/debug", "127.0.0.1:5000")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found");
}

#[tokio::test]
async fn debug_refuses_remote_peers() {
    let app = app_with(true).await;
    let (status, _) = send_json(&app, get_from("/debug", "203.0.113.9:5000")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn debug_snapshot_hides_secrets() {
    let app = app_with(true).await;
    send_json(
        &app,
        json_request("/api/register", &json!({"username": "grace", "password": "pw"})),
    )
    .await;

    let (status, body) = send_json(&app, get_from("/debug", "[::1]:5000")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database_connected"], true);
    assert_eq!(body["total_users"], 1);
    assert!(
        body["tables"]
            .as_array()
            .unwrap()
            .iter()
            .any(|t| t == "user_info")
    );
    assert!(
        body["user_info_columns"]
            .as_array()
            .unwrap()
            .iter()
            .any(|c| c["Field"] == "password_hash")
    );
    let sample = &body["sample_users"][0];
    assert_eq!(sample["username"], "grace");
    assert_eq!(sample["password"], "HIDDEN");
    assert!(body["db_config"].get("password").is_none());
    assert!(!body.to_string().contains("argon2"));
}

#[tokio::test]
async fn unknown_paths_are_json_404() {
    let app = app().await;
    let (status, body) =
        send_json(&app, Request::get("/nope").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Endpoint not found"}));
}
