use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

mod common;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_root_welcome() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Welcome to Sanakota Backend API");
    assert_eq!(body["endpoints"]["words"], "/api/words");
}

#[tokio::test]
async fn test_health_degraded_without_store() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
    assert!(body["uptime"].is_u64());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent/path")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Route not found");
    assert_eq!(body["path"], "/nonexistent/path");
}

#[tokio::test]
async fn test_search_requires_query() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/words/search")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Search query is required");
}

#[tokio::test]
async fn test_search_rejects_blank_query() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/words/search?q=%20%20")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_requires_lemma_and_pos() {
    let cases = [
        r#"{}"#,
        r#"{"lemma":"kala"}"#,
        r#"{"pos":"noun"}"#,
        r#"{"lemma":"","pos":"noun"}"#,
        r#"{"lemma":"kala","pos":"  "}"#,
    ];

    for body in cases {
        let app = common::create_test_app().await;
        let response = app
            .oneshot(json_request("POST", "/api/words", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");

        let payload = body_json(response).await;
        assert_eq!(payload["success"], false);
    }
}

#[tokio::test]
async fn test_create_rejects_malformed_json() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(json_request("POST", "/api/words", "not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn test_create_validation_runs_before_store_access() {
    // A well-formed creation reaches the store layer, which is absent here.
    let app = common::create_test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/words",
            r#"{"lemma":"kala","pos":"noun"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Database unavailable");
}

#[tokio::test]
async fn test_update_rejects_blank_lemma() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(json_request("PUT", "/api/words/1", r#"{"lemma":"   "}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Lemma must be a non-empty string");
}

#[tokio::test]
async fn test_update_allows_empty_body() {
    // No fields is a valid partial update; only the store stops it here.
    let app = common::create_test_app().await;

    let response = app
        .oneshot(json_request("PUT", "/api/words/1", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_list_reports_store_failure() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/words")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_non_numeric_id_is_rejected() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/words/abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_reports_store_failure() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/words/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
