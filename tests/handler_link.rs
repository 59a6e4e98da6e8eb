mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};
use shortgate::domain::TaskKind;

#[tokio::test]
async fn test_create_link_created() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/api/link")
        .json(&json!({ "url": "https://example.com/page", "limit": 3 }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let body = response.json::<Value>();
    let hash = body["hash"].as_str().unwrap();
    let short_url = format!("{}/{}", common::BASE_URL, hash);

    assert_eq!(response.header("location"), short_url.as_str());
    assert_eq!(body["url"], short_url);
    assert!(body["qr"].is_null());
    assert_eq!(body["properties"]["redirect_limit"], 3);
    assert_eq!(body["properties"]["reachability"], "pending");
}

#[tokio::test]
async fn test_create_link_with_qr_and_custom_hash() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/api/link")
        .json(&json!({
            "url": "https://example.com/page",
            "qr": true,
            "custom_hash": "my-link"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["hash"], "my-link");
    assert_eq!(body["qr"], format!("{}/my-link/qr", common::BASE_URL));
    assert_eq!(body["properties"]["redirect_limit"], 0);
}

#[tokio::test]
async fn test_create_link_negative_limit() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/api/link")
        .json(&json!({ "url": "https://example.com", "limit": -1 }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_create_link_invalid_url() {
    let app = common::spawn_app();

    for url in ["not-a-url", "ftp://example.com/file"] {
        let response = app
            .server
            .post("/api/link")
            .json(&json!({ "url": url }))
            .await;

        response.assert_status_bad_request();
    }
}

#[tokio::test]
async fn test_create_link_reserved_custom_hash() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/api/link")
        .json(&json!({ "url": "https://example.com", "custom_hash": "health" }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_create_link_duplicate_custom_hash() {
    let app = common::spawn_app();
    let body = json!({ "url": "https://example.com", "custom_hash": "taken" });

    app.server
        .post("/api/link")
        .json(&body)
        .await
        .assert_status(StatusCode::CREATED);

    let response = app.server.post("/api/link").json(&body).await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_queues_verification() {
    let app = common::spawn_app();

    app.create_link(json!({ "url": "https://example.com", "qr": true }))
        .await;

    assert_eq!(app.dispatcher.queue_depth(TaskKind::Reachability), 1);
    assert_eq!(app.dispatcher.queue_depth(TaskKind::Qr), 1);
}

#[tokio::test]
async fn test_link_status() {
    let app = common::spawn_app();
    let hash = app.create_simple_link(5).await;

    let response = app.server.get(&format!("/api/link/{hash}")).await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["hash"], hash);
    assert_eq!(body["target"], "https://example.com/target");
    assert_eq!(body["reachability"], "pending");
    assert_eq!(body["qr"], "not_requested");
    assert_eq!(body["redirects_used"], 0);
    assert_eq!(body["redirect_limit"], 5);
}

#[tokio::test]
async fn test_link_status_not_found() {
    let app = common::spawn_app();

    let response = app.server.get("/api/link/nothing-here").await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_link_clicks_unknown_link() {
    let app = common::spawn_app();

    let response = app.server.get("/api/link/nothing-here/clicks").await;

    response.assert_status_not_found();
}
