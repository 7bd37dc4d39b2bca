#![allow(clippy::unwrap_used)] // Integration tests use unwrap for brevity

//! Integration tests for the embedded server routes and the native backend
//! lifecycle.

use std::fs;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::Path;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use webshell_backend::routes::{ApiResponse, build_router};
use webshell_backend::NativeBackend;
use webshell_core::Config;

fn static_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "<h1>webshell</h1>").unwrap();
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs/index.html"), "docs home").unwrap();
    dir
}

/// Send a request to the router and return (status, body text).
async fn send(root: &Path, request: Request<Body>) -> (StatusCode, String) {
    let resp = build_router(root).oneshot(request).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&body).into_owned())
}

async fn get(root: &Path, uri: &str) -> (StatusCode, String) {
    send(root, Request::get(uri).body(Body::empty()).unwrap()).await
}

// =========================================================================
// Routes
// =========================================================================

#[tokio::test]
async fn ping_answers_get_and_post() {
    let dir = static_dir();

    let (status, text) = get(dir.path(), "/api/ping").await;
    assert_eq!(status, StatusCode::OK);
    let reply: ApiResponse = serde_json::from_str(&text).unwrap();
    assert_eq!(reply.status, 200);
    assert_eq!(reply.message.as_deref(), Some("Ping request received"));

    let request = Request::post("/api/ping").body(Body::empty()).unwrap();
    let (status, _) = send(dir.path(), request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn form_fields_are_echoed() {
    let dir = static_dir();
    let request = Request::post("/api/form")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("name=Ada&lang=rust"))
        .unwrap();

    let (status, text) = send(dir.path(), request).await;

    assert_eq!(status, StatusCode::OK);
    let reply: ApiResponse = serde_json::from_str(&text).unwrap();
    assert_eq!(reply.message.as_deref(), Some("Received 2 fields"));
    assert_eq!(
        reply.data.unwrap(),
        json!({"formFields": {"lang": "rust", "name": "Ada"}})
    );
}

#[tokio::test]
async fn root_serves_index_html() {
    let dir = static_dir();

    let (status, text) = get(dir.path(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "<h1>webshell</h1>");

    let (status, text) = get(dir.path(), "/docs/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "docs home");
}

#[tokio::test]
async fn unknown_path_returns_404() {
    let dir = static_dir();
    let (status, text) = get(dir.path(), "/missing.js").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(text, "Not found");
}

// =========================================================================
// Native backend lifecycle
// =========================================================================

fn backend_on_ephemeral_port(static_root: &Path) -> NativeBackend {
    let mut config = Config::default();
    config.server.port = 0;
    config.server.static_dir = static_root.to_path_buf();
    config.storage.data_dir = Some(static_root.join("data"));
    NativeBackend::new(config)
}

fn http_get(url: &str, path: &str) -> String {
    let authority = url.trim_start_matches("http://");
    let mut stream = TcpStream::connect(authority).unwrap();
    write!(
        stream,
        "GET {path} HTTP/1.1\r\nHost: {authority}\r\nConnection: close\r\n\r\n"
    )
    .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    response
}

#[test]
fn backend_starts_serves_and_stops() {
    let dir = static_dir();
    let backend = backend_on_ephemeral_port(dir.path());

    assert!(backend.init());
    assert!(backend.is_running());
    assert!(dir.path().join("data/Music").is_dir());

    let url = backend.server_url();
    assert!(url.starts_with("http://127.0.0.1:"));
    assert!(!url.ends_with(":0"));
    assert!(backend.test_connectivity());

    let response = http_get(&url, "/api/ping");
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");

    let status: Value = serde_json::from_str(&backend.status()).unwrap();
    assert_eq!(status["status"], "running");
    assert_eq!(status["url"], json!(url));

    let reply: Value = serde_json::from_str(&backend.handle_message("[1,2]")).unwrap();
    assert_eq!(reply["server_url"], json!(url));

    assert!(backend.stop_server());
    assert!(!backend.is_running());
    assert!(!backend.stop_server());
}

#[test]
fn second_start_keeps_first_server() {
    let dir = static_dir();
    let backend = backend_on_ephemeral_port(dir.path());

    assert!(backend.start_server(0));
    let first = backend.server_url();
    assert!(backend.start_server(0));
    assert_eq!(backend.server_url(), first);

    assert!(backend.stop_server());
}

#[test]
fn busy_port_fails_to_start() {
    let dir = static_dir();
    let holder = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = holder.local_addr().unwrap().port();
    let backend = backend_on_ephemeral_port(dir.path());

    assert!(!backend.start_server(port));
    assert!(!backend.is_running());
}

#[test]
fn concurrent_starts_leave_one_server() {
    let dir = static_dir();
    let backend = backend_on_ephemeral_port(dir.path());

    let started = std::thread::scope(|scope| {
        let first = scope.spawn(|| backend.start_server(0));
        let second = scope.spawn(|| backend.start_server(0));
        [first.join().unwrap(), second.join().unwrap()]
    });

    assert_eq!(started, [true, true]);
    assert!(backend.is_running());
    assert!(backend.test_connectivity());
    assert!(backend.stop_server());
    assert!(!backend.stop_server());
}
