//! HTTP-level tests for the dry-run validation endpoint.
//!
//! The endpoint always responds 200: validation findings are returned as
//! data so editors can render "N errors, M warnings" without special-casing
//! failures.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, invalid_doc, post_json, valid_doc, TENANT};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_valid_graph_reports_clean(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(&app, "/api/v1/flows/validate", Some(TENANT), valid_doc()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["is_valid"], true);
    assert_eq!(body["data"]["errors"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["warnings"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_invalid_graph_reports_errors_with_200(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(&app, "/api/v1/flows/validate", Some(TENANT), invalid_doc()).await;
    assert_eq!(response.status(), StatusCode::OK, "findings are data, not failures");

    let body = body_json(response).await;
    assert_eq!(body["data"]["is_valid"], false);

    let errors = body["data"]["errors"].as_array().unwrap();
    assert!(!errors.is_empty());
    let rules: Vec<&str> = errors.iter().map(|e| e["rule"].as_str().unwrap()).collect();
    assert!(rules.contains(&"empty_message"));
    assert!(rules.contains(&"missing_required_slot"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_warnings_do_not_affect_validity(pool: PgPool) {
    let app = build_test_app(pool);

    // A decision with a bound default but unbound conditions: valid, with
    // one unreachable-condition warning per unbound branch.
    let doc = json!({
        "metadata": { "name": "Routing" },
        "nodes": [
            {
                "id": "start1",
                "type": "start",
                "label": "Start",
                "config": { "greeting": "Hi" },
                "connections": [ { "target": "d1" } ]
            },
            {
                "id": "d1",
                "type": "decision",
                "label": "Route",
                "config": {
                    "conditions": [
                        { "id": "c1", "name": "Sales", "value": "1" },
                        { "id": "c2", "name": "Support", "value": "2" }
                    ]
                },
                "connections": [ { "slot": "default", "target": "end1" } ]
            },
            {
                "id": "end1",
                "type": "end",
                "label": "End",
                "config": {}
            }
        ]
    });

    let response = post_json(&app, "/api/v1/flows/validate", Some(TENANT), doc).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["is_valid"], true);

    let warnings = body["data"]["warnings"].as_array().unwrap();
    let unreachable = warnings
        .iter()
        .filter(|w| w["rule"] == "unreachable_condition")
        .count();
    assert_eq!(unreachable, 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_validate_requires_tenant_context(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(&app, "/api/v1/flows/validate", None, valid_doc()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
