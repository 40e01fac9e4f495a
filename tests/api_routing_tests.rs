//! API routing tests
//!
//! Exercise the assembled router without a live database: public probes,
//! authentication rejection and the error response shape.

mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use ict_inventory::routes::create_router;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn test_health_endpoint_is_public() {
    let app = create_router(common::create_test_state());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_assets_require_authentication() {
    let app = create_router(common::create_test_state());

    let response = app
        .oneshot(Request::builder().uri("/api/v1/assets").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], 401);
    assert_eq!(json["error"]["message"], "Authentication failed");
}

#[tokio::test]
async fn test_garbage_bearer_token_rejected() {
    let app = create_router(common::create_test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/reports/all")
                .header("authorization", "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_mutations_require_authentication() {
    for (method, uri) in [
        (Method::POST, "/api/v1/assets"),
        (Method::PUT, "/api/v1/auth/change-password"),
        (Method::POST, "/api/v1/users"),
        (Method::GET, "/api/v1/audit/logs"),
        (Method::GET, "/api/v1/reports/movement/export"),
    ] {
        let app = create_router(common::create_test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method(method.clone())
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{} {} should require auth",
            method,
            uri
        );
    }
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = create_router(common::create_test_state());

    let response = app
        .oneshot(Request::builder().uri("/api/v1/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_header_present() {
    let app = create_router(common::create_test_state());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-request-id"));
    assert!(response.headers().contains_key("x-trace-id"));
}

#[tokio::test]
async fn test_trace_id_propagates_from_request() {
    let app = create_router(common::create_test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-trace-id", "trace-abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("x-trace-id").and_then(|v| v.to_str().ok()),
        Some("trace-abc-123")
    );
}
