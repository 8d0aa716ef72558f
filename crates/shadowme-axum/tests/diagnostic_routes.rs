//! Integration tests for `/api/voices` and `/api/status`.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{TestApp, parse_json, recording};

#[tokio::test]
async fn test_voices_lists_only_service_clones() {
    let app = TestApp::new().await;
    app.provider.add_voice("v-rachel", "Rachel", Some("premade"));
    app.provider
        .add_voice("v-old", "user_voice_1700000000000", Some("cloned"));
    app.provider
        .add_voice("v-other", "someone_else", Some("cloned"));

    let response = app.get("/api/voices").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["totalVoices"], 3);
    assert_eq!(body["userVoices"], 1);
    assert_eq!(body["userVoiceList"][0]["id"], "v-old");
    assert_eq!(body["apiKeyStatus"], "valid");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_voices_reports_provider_failure_in_body() {
    let app = TestApp::new().await;
    app.provider.fail_listing();

    let response = app.get("/api/voices").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["apiKeyStatus"], "unknown");
    assert!(body["error"].as_str().unwrap().contains("list offline"));
}

#[tokio::test]
async fn test_status_reports_masked_key_and_cache_size() {
    let app = TestApp::new().await;
    app.post_json(
        "/api/clone-voice",
        json!({ "text": "Sample", "audioData": recording(), "sessionId": "s1" }),
    )
    .await;

    let body = parse_json(app.get("/api/status").await).await;

    assert_eq!(body["apiKeyExists"], true);
    assert_eq!(body["apiKeyPrefix"], "sk_test_...");
    assert_eq!(body["cachedSessions"], 1);
    assert_eq!(body["cacheTtlSecs"], 1800);
    assert_eq!(body["defaultVoiceId"], "21m00Tcm4TlvDq8ikWAM");
    assert_eq!(body["timestamp"], "2025-01-01T00:00:00Z");
}

#[tokio::test]
async fn test_unknown_api_route_is_not_found() {
    let app = TestApp::new().await;

    let response = app.get("/api/models").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
