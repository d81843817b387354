// SPDX-License-Identifier: MIT

//! API input validation tests.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

fn json_post(uri: &str, payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_verify_rejects_empty_uid() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(json_post(
            "/api/v1/auth/verify",
            serde_json::json!({ "uid": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_login_rejects_invalid_email() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(json_post(
            "/api/v1/auth/admin/login",
            serde_json::json!({ "email": "not-an-email", "password": "secret" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_rejects_blank_query() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/items/search?q=%20%20")
                .header(header::AUTHORIZATION, "Bearer user-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["details"], "Search query cannot be empty");
}

#[tokio::test]
async fn test_search_rejects_missing_query() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/items/search")
                .header(header::AUTHORIZATION, "Bearer user-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_user_rejects_uid_mismatch() {
    let (app, _) = common::create_test_app();

    let payload = serde_json::json!({
        "uid": "someone-else",
        "email": "user@example.com",
        "full_name": "Test User",
    });

    let mut request = json_post("/api/v1/user/create", payload);
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer user-1".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_user_rejects_invalid_email() {
    let (app, _) = common::create_test_app();

    let payload = serde_json::json!({
        "uid": "user-1",
        "email": "not-an-email",
        "full_name": "Test User",
    });

    let mut request = json_post("/api/v1/user/create", payload);
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer user-1".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_item_rejects_empty_name() {
    let (app, _) = common::create_test_app();

    let payload = serde_json::json!({
        "name": "",
        "description": "Fresh bread",
        "category": "food",
    });

    let mut request = json_post("/api/v1/items", payload);
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer user-1".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_json_body() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/auth/admin/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
