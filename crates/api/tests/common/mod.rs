//! Shared helpers for HTTP integration tests.
//!
//! Builds the full application router (same middleware stack as
//! production) over the `#[sqlx::test]` pool and provides small request
//! helpers that stamp the tenant/actor headers the upstream gateway would
//! normally set.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use voxflow_api::config::ServerConfig;
use voxflow_api::router::build_app_router;
use voxflow_api::state::AppState;

/// Default tenant and actor used by most tests.
pub const TENANT: i64 = 7;
pub const OTHER_TENANT: i64 = 8;
pub const ACTOR: i64 = 42;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    tenant: Option<i64>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(tenant_id) = tenant {
        builder = builder
            .header("x-tenant-id", tenant_id.to_string())
            .header("x-actor-id", ACTOR.to_string());
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, tenant: Option<i64>) -> Response {
    send(app, "GET", uri, tenant, None).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    tenant: Option<i64>,
    body: serde_json::Value,
) -> Response {
    send(app, "POST", uri, tenant, Some(body)).await
}

pub async fn put_json(
    app: &Router,
    uri: &str,
    tenant: Option<i64>,
    body: serde_json::Value,
) -> Response {
    send(app, "PUT", uri, tenant, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, tenant: Option<i64>) -> Response {
    send(app, "DELETE", uri, tenant, None).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// A graph document that passes validation: start -> say -> end.
pub fn valid_doc() -> serde_json::Value {
    serde_json::json!({
        "metadata": { "name": "Greeting flow" },
        "nodes": [
            {
                "id": "start1",
                "type": "start",
                "label": "Start",
                "config": { "greeting": "Hello!" },
                "connections": [ { "target": "say1" } ]
            },
            {
                "id": "say1",
                "type": "say",
                "label": "Hours",
                "config": { "message": "We are open 9 to 5." },
                "connections": [ { "slot": "next", "target": "end1" } ]
            },
            {
                "id": "end1",
                "type": "end",
                "label": "End",
                "config": {}
            }
        ]
    })
}

/// A graph document with an empty say message and a missing required edge.
pub fn invalid_doc() -> serde_json::Value {
    serde_json::json!({
        "metadata": { "name": "Broken flow" },
        "nodes": [
            {
                "id": "start1",
                "type": "start",
                "label": "Start",
                "config": { "greeting": "Hello!" },
                "connections": [ { "target": "say1" } ]
            },
            {
                "id": "say1",
                "type": "say",
                "label": "Empty",
                "config": { "message": "" },
                "connections": []
            }
        ]
    })
}
