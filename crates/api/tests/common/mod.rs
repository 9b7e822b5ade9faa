//! Shared helpers for HTTP-level integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use chrono::{TimeZone, Utc};
use crm_api::config::ServerConfig;
use crm_api::router::build_app_router;
use crm_api::state::AppState;
use crm_core::clock::ManualClock;
use crm_core::types::Timestamp;
use crm_domain::{DomainService, FileStore};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "crm-test-boundary";

/// Wednesday, 15 May 2024, 12:00 UTC.
pub fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()
}

/// Build a test `ServerConfig` with safe defaults rooted at `upload_dir`.
pub fn test_config(upload_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload_dir,
        max_upload_bytes: 1024 * 1024,
        team_seed_file: None,
    }
}

/// The application under test plus the resources it borrows.
pub struct TestApp {
    router: Router,
    pub clock: Arc<ManualClock>,
    pub uploads: TempDir,
}

impl TestApp {
    /// A fresh handle to the router; each request consumes one.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool, a pinned clock, and a scratch upload directory.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let uploads = tempfile::tempdir().unwrap();
    let config = test_config(uploads.path().to_path_buf());
    let clock = Arc::new(ManualClock::new(t0()));

    let domain = DomainService::new(
        pool.clone(),
        FileStore::new(uploads.path()),
        clock.clone(),
    );
    let state = AppState {
        pool,
        domain,
    };

    TestApp {
        router: build_app_router(state, &config),
        clock,
        uploads,
    }
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

async fn send_json(app: Router, method: Method, uri: &str, body: Value) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn patch_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send_json(app, Method::PATCH, uri, body).await
}

/// A hand-built multipart body. `file` is `(filename, content type, bytes)`.
pub fn multipart_body(file: Option<(&str, &str, &[u8])>, name: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some((filename, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(name) = name {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\n{name}\r\n")
                .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(app: Router, uri: &str, body: Vec<u8>) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Insert a team member through the domain layer, returning its id.
pub async fn seed_member(pool: &PgPool, name: &str) -> i64 {
    let domain = DomainService::new(
        pool.clone(),
        FileStore::new(std::env::temp_dir()),
        Arc::new(ManualClock::new(t0())),
    );
    domain
        .create_team_member(&json!({
            "name": name,
            "email": format!("{}@firm.test", name.to_lowercase()),
            "role": "Advisor",
        }))
        .await
        .unwrap()
        .id
}
