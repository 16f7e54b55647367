mod helpers;

use axum::http::StatusCode;
use helpers::*;
use serde_json::{json, Value};

#[tokio::test]
async fn test_create_upload_returns_ticket() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/api/uploads")
        .json(&json!({ "title": "Holiday", "description": "Beach day" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["id"], "upload-1");
    assert_eq!(body["url"], "https://storage.example.com/upload-1");
    assert_eq!(
        app.provider.uploads.lock().unwrap().clone(),
        vec![("Holiday".to_string(), "Beach day".to_string())]
    );
}

#[tokio::test]
async fn test_create_upload_description_is_optional() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/api/uploads")
        .json(&json!({ "title": "Holiday" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(
        app.provider.uploads.lock().unwrap().clone(),
        vec![("Holiday".to_string(), String::new())]
    );
}

#[tokio::test]
async fn test_create_upload_requires_title() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/api/uploads")
        .json(&json!({ "title": "", "description": "no title" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "INVALID_INPUT");
    assert!(app.provider.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_upload_rejects_malformed_body() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/api/uploads")
        .json(&json!({ "description": "missing title" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_create_upload_provider_failure() {
    let app = setup_test_app().await;
    app.provider.fail("quota exceeded");

    let response = app
        .server
        .post("/api/uploads")
        .json(&json!({ "title": "Holiday" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    let body = response.json::<Value>();
    assert_eq!(body["code"], "PROVIDER_ERROR");
    assert_eq!(body["recoverable"], true);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to create upload URL: "));
}

#[tokio::test]
async fn test_list_assets_uses_default_limit_and_playback_urls() {
    let provider = FakeProvider::with_assets(vec![ready_asset("asset-1", "pb-1", "Holiday")]);
    let app = setup_test_app_with(test_config(), provider).await;

    let response = app.server.get("/api/assets").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    let assets = body.as_array().unwrap();
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0]["title"], "Holiday");
    assert_eq!(
        assets[0]["thumbnail_url"],
        "https://image.mux.com/pb-1/thumbnail.jpg?time=0&width=320"
    );
    assert_eq!(assets[0]["stream_url"], "https://stream.mux.com/pb-1.m3u8");
    assert!(assets[0].get("tracked_status").is_none());
    assert_eq!(app.provider.list_limits.lock().unwrap().clone(), vec![10]);
}

#[tokio::test]
async fn test_list_assets_clamps_limit() {
    let app = setup_test_app().await;

    app.server
        .get("/api/assets")
        .add_query_param("limit", 500)
        .await
        .assert_status_ok();
    app.server
        .get("/api/assets")
        .add_query_param("limit", 0)
        .await
        .assert_status_ok();

    assert_eq!(app.provider.list_limits.lock().unwrap().clone(), vec![100, 1]);
}

#[tokio::test]
async fn test_list_assets_includes_tracked_status() {
    let provider = FakeProvider::with_assets(vec![ready_asset("asset-1", "pb-1", "Holiday")]);
    let app = setup_test_app_with(test_config(), provider).await;

    let body = event_body("video.asset.ready", "asset-1");
    app.server
        .post("/api/mux")
        .add_header(signature_header_name(), sign(&body))
        .text(body)
        .await
        .assert_status_ok();

    let assets = app.server.get("/api/assets").await.json::<Value>();
    assert_eq!(assets[0]["tracked_status"], "ready");
}

#[tokio::test]
async fn test_list_assets_with_stalled_status_store() {
    let assets = (0..20)
        .map(|i| ready_asset(&format!("asset-{}", i), &format!("pb-{}", i), "Clip"))
        .collect();
    let app = setup_test_app_with(test_config(), FakeProvider::with_assets(assets)).await;
    app.store.set_slow_reads(true);

    let started = std::time::Instant::now();
    let response = app
        .server
        .get("/api/assets")
        .add_query_param("limit", 20)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 20);
    assert!(listed.iter().all(|a| a.get("tracked_status").is_none()));
    // One 200ms status timeout for the whole page, not one per asset.
    assert!(started.elapsed() < std::time::Duration::from_secs(2));
}

#[tokio::test]
async fn test_list_assets_provider_failure() {
    let app = setup_test_app().await;
    app.provider.fail("unauthorized");

    let response = app.server.get("/api/assets").await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    assert!(response.json::<Value>()["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to fetch assets: "));
}

#[tokio::test]
async fn test_delete_asset() {
    let provider = FakeProvider::with_assets(vec![ready_asset("asset-1", "pb-1", "Holiday")]);
    let app = setup_test_app_with(test_config(), provider).await;

    let response = app.server.delete("/api/assets/asset-1").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "success": true }));
    assert_eq!(
        app.provider.deleted.lock().unwrap().clone(),
        vec!["asset-1".to_string()]
    );
}

#[tokio::test]
async fn test_delete_missing_asset() {
    let app = setup_test_app().await;

    let response = app.server.delete("/api/assets/missing").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_delete_invalid_asset_id() {
    let app = setup_test_app().await;

    let response = app.server.delete("/api/assets/bad.id").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_provider_failure() {
    let provider = FakeProvider::with_assets(vec![ready_asset("asset-1", "pb-1", "Holiday")]);
    let app = setup_test_app_with(test_config(), provider).await;
    app.provider.fail("internal");

    let response = app.server.delete("/api/assets/asset-1").await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    assert!(response.json::<Value>()["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to delete asset: "));
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = setup_test_app().await;

    let health = app.server.get("/health").await;
    assert_eq!(health.status_code(), StatusCode::OK);
    let body = health.json::<Value>();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["status_store"], "healthy");
    assert_eq!(body["webhook_secret"], "configured");
    assert_eq!(body["provider_credentials"], "configured");
    assert_eq!(body["status_updates"]["applied"], 0);

    let live = app.server.get("/health/live").await;
    assert_eq!(live.json::<Value>(), json!({ "status": "alive" }));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_test_app().await;

    let response = app.server.get("/api/openapi.json").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let spec = response.json::<Value>();
    assert!(spec["paths"]["/api/mux"].is_object());
    assert!(spec["paths"]["/api/assets/{id}"].is_object());
}
