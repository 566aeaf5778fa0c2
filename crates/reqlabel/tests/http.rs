use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use reqlabel::handlers::{AppState, router};
use reqlabel::rate_limit::RateLimiterLayer;
use reqlabel::{LabelContext, build_annotator};

fn make_state() -> AppState {
    let tempdir = tempfile::tempdir().unwrap();
    std::fs::write(tempdir.path().join("adj.txt"), b"quick\n").unwrap();
    std::fs::write(tempdir.path().join("vague.txt"), b"user friendly\nas needed\n").unwrap();
    let ctx = LabelContext::load(tempdir.path(), None).unwrap();
    let annotator = build_annotator(&ctx, None, None).unwrap();
    AppState {
        ctx: Arc::new(ctx),
        annotator,
    }
}

async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

#[tokio::test]
async fn healthz_ok() {
    let app = router(make_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn label_endpoint_returns_matches() {
    let (status, body) = get(
        router(make_state()),
        "/v1/label?text=A%20quick%2C%20user-friendly%20UI",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0]["category"], "vague");
    assert_eq!(matches[0]["word"], "user-friendly");
    assert_eq!(matches[1]["category"], "adj");
    assert_eq!(matches[1]["word"], "quick");
}

#[tokio::test]
async fn label_endpoint_returns_empty_list_without_matches() {
    let (status, body) = get(router(make_state()), "/v1/label?text=Nothing%20here").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matches"], serde_json::json!([]));
}

#[tokio::test]
async fn label_endpoint_rejects_long_text() {
    let text = "a".repeat(reqlabel::MAX_TEXT_LEN + 1);
    let (status, body) = get(router(make_state()), &format!("/v1/label?text={text}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap_or_default()
            .contains("at most")
    );
}

#[tokio::test]
async fn requirement_endpoint_returns_rows() {
    let (status, body) = get(
        router(make_state()),
        "/v1/requirement?line=R3%3A%201%2C%27Retry%20as%20needed%27%2CFR",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requirement"]["id"], "R3");
    assert_eq!(body["requirement"]["text"], "Retry as needed");
    assert_eq!(body["header"][4], "CATEGORIA");
    assert_eq!(
        body["rows"],
        serde_json::json!([["R3", "1", "Retry as needed", "FR", "vague", "as needed"]])
    );

    let (_, body) = get(
        router(make_state()),
        "/v1/requirement?line=R4%3A%201%2C%27Nothing%27%2CFR",
    )
    .await;
    assert_eq!(
        body["rows"],
        serde_json::json!([["R4", "1", "Nothing", "FR", "NULL", "NULL"]])
    );
}

#[tokio::test]
async fn requirement_endpoint_rejects_bad_lines() {
    let (status, body) = get(router(make_state()), "/v1/requirement?line=not%20a%20line").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap_or_default()
            .contains("invalid requirement line")
    );
}

#[tokio::test]
async fn categories_lists_rules_and_entry_counts() {
    let (status, body) = get(router(make_state()), "/v1/categories").await;
    assert_eq!(status, StatusCode::OK);
    let categories = body["categories"].as_array().unwrap();
    assert_eq!(categories[0]["name"], "vpastp");
    let vague = categories
        .iter()
        .find(|c| c["name"] == "vague")
        .unwrap();
    assert_eq!(vague["words"], 0);
    assert_eq!(vague["phrases"], 2);
    assert_eq!(vague["pos"], serde_json::json!(["ADJ", "ADV"]));
}

#[tokio::test]
async fn rate_limiter_rejects_exhausted_clients() {
    let app = router(make_state()).layer(RateLimiterLayer::new(1, 1));
    let request = || {
        Request::builder()
            .uri("/healthz")
            .header("X-Forwarded-For", "203.0.113.7")
            .body(Body::empty())
            .unwrap()
    };
    let first = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let second = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

    let other = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .header("X-Real-IP", "198.51.100.2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::OK);
}
