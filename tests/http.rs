mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use relay_rest::{router, AppState};
use serde_json::Value;
use tower::ServiceExt;

fn app() -> Router {
    router(AppState::new(common::service()))
}

async fn get(uri: &str) -> (StatusCode, axum::http::HeaderMap, Value) {
    let res = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, headers, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn list_is_bare_array_with_total_header() {
    let (status, headers, body) = get("/users?_page=2&_per_page=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-total-count"], "15");
    assert_eq!(body.as_array().unwrap().len(), 5);
    assert_eq!(body[0]["id"], 6);
    let link = headers[header::LINK].to_str().unwrap();
    assert!(link.contains("</users?_page=3&_per_page=5>; rel=\"next\""));
    assert!(link.contains("</users?_page=3&_per_page=5>; rel=\"last\""));
}

#[tokio::test]
async fn range_mode_has_no_link_header() {
    let (status, headers, body) = get("/users?_start=10&_end=20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-total-count"], "15");
    assert_eq!(body.as_array().unwrap().len(), 5);
    assert!(!headers.contains_key(header::LINK));
}

#[tokio::test]
async fn unknown_resource_is_404() {
    let (status, _, body) = get("/widgets").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn read_one_row() {
    let (status, _, body) = get("/posts/1?_embed=user").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Hello");
    assert_eq!(body["user"]["fullName"], "Alice");

    let (status, _, _) = get("/posts/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_and_ready() {
    let (status, _, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, _, body) = get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resources"], 3);
}
