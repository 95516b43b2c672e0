// crates/dnr-replay-solver/tests/http_solver.rs
// ============================================================================
// Module: HTTP Solver Client Tests
// Description: Drives the solver client against a local test server.
// Purpose: Validate request encoding, status handling, and response limits.
// Dependencies: dnr-replay-solver, dnr-replay-core, tiny_http
// ============================================================================

//! ## Overview
//! Each test spawns a one-shot `tiny_http` server, submits a payload, and
//! checks both what the server received and what the client returned.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::mpsc;
use std::thread;

use dnr_replay_config::SolverConfig;
use dnr_replay_core::SolverClient;
use dnr_replay_core::SolverError;
use dnr_replay_core::runtime::gzip_decompress_text;
use dnr_replay_solver::HttpSolverClient;
use serde_json::Value;
use serde_json::json;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Request as observed by the test server.
struct Received {
    method: String,
    content_encoding: Option<String>,
    content_type: Option<String>,
    body: Vec<u8>,
}

/// Spawns a one-shot server answering with `reply` and `status`.
fn spawn_solver(reply: &'static str, status: u16) -> (String, mpsc::Receiver<Received>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        if let Ok(mut request) = server.recv() {
            let header = |name: &'static str| {
                request
                    .headers()
                    .iter()
                    .find(|header| header.field.equiv(name))
                    .map(|header| header.value.as_str().to_string())
            };
            let content_encoding = header("Content-Encoding");
            let content_type = header("Content-Type");
            let method = request.method().as_str().to_string();
            let mut body = Vec::new();
            request.as_reader().read_to_end(&mut body).unwrap();
            let _ = tx.send(Received {
                method,
                content_encoding,
                content_type,
                body,
            });
            let _ = request.respond(Response::from_string(reply).with_status_code(status));
        }
    });
    (format!("http://{addr}/solve"), rx)
}

fn client_for(url: String, max_response_bytes: usize) -> HttpSolverClient {
    HttpSolverClient::new(&SolverConfig {
        url,
        timeout_ms: 5_000,
        max_response_bytes,
    })
    .unwrap()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn submits_gzip_json_and_returns_new_correlation_id() {
    let (url, received) = spawn_solver(r#"{"correlation_id": "def", "status": "queued"}"#, 200);
    let client = client_for(url.clone(), 1024);
    let payload = json!({"campaign": 7, "screens": ["s1", "s2"]});

    let response = client.submit(&payload).unwrap();

    assert_eq!(response.correlation_id.as_str(), "def");
    assert_eq!(response.extra.get("status"), Some(&json!("queued")));
    assert_eq!(client.endpoint(), url);

    let request = received.recv().unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(request.content_encoding.as_deref(), Some("gzip"));
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
    let text = gzip_decompress_text(&request.body, 1024).unwrap();
    let sent: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(sent, payload);
}

#[test]
fn nested_solver_ids_are_returned_verbatim() {
    let (url, _received) = spawn_solver(r#"{"correlation_id": "runs/2024/xyz"}"#, 200);
    let client = client_for(url, 1024);
    let response = client.submit(&json!({})).unwrap();
    assert_eq!(response.correlation_id.as_str(), "runs/2024/xyz");
}

#[test]
fn non_success_status_is_reported_with_body() {
    let (url, _received) = spawn_solver("solver overloaded", 503);
    let client = client_for(url, 1024);

    let result = client.submit(&json!({}));

    match result {
        Err(SolverError::Status {
            status,
            body,
        }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "solver overloaded");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[test]
fn response_without_correlation_id_is_invalid() {
    let (url, _received) = spawn_solver(r#"{"status": "queued"}"#, 200);
    let client = client_for(url, 1024);
    assert!(matches!(client.submit(&json!({})), Err(SolverError::InvalidResponse(_))));
}

#[test]
fn empty_correlation_id_is_invalid() {
    let (url, _received) = spawn_solver(r#"{"correlation_id": ""}"#, 200);
    let client = client_for(url, 1024);
    assert!(matches!(client.submit(&json!({})), Err(SolverError::InvalidResponse(_))));
}

#[test]
fn non_json_response_is_invalid() {
    let (url, _received) = spawn_solver("<html>ok</html>", 200);
    let client = client_for(url, 1024);
    assert!(matches!(client.submit(&json!({})), Err(SolverError::InvalidResponse(_))));
}

#[test]
fn oversized_response_is_rejected() {
    let (url, _received) = spawn_solver(r#"{"correlation_id": "def", "padding": "xxxxxxxxxxxxxxxx"}"#, 200);
    let client = client_for(url, 16);
    assert!(matches!(
        client.submit(&json!({})),
        Err(SolverError::TooLarge {
            max_bytes: 16,
            ..
        })
    ));
}

#[test]
fn unreachable_endpoint_is_an_http_error() {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    drop(server);
    let client = client_for(format!("http://{addr}/solve"), 1024);
    assert!(matches!(client.submit(&json!({})), Err(SolverError::Http(_))));
}

#[test]
fn rejects_invalid_configuration() {
    let result = HttpSolverClient::new(&SolverConfig {
        url: "not a url".to_string(),
        timeout_ms: 5_000,
        max_response_bytes: 1024,
    });
    assert!(matches!(result, Err(SolverError::Http(_))));
}
