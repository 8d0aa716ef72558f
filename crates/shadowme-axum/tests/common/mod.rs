//! Shared harness for router integration tests.
//!
//! Builds an `AxumContext` over the fake provider, a manual clock and an
//! in-memory SQLite database.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use http_body_util::BodyExt;
use tower::ServiceExt;

use shadowme_axum::{AxumContext, CorsConfig, ProviderStatus, create_router};
use shadowme_core::testing::{FakeVoiceProvider, ManualClock};
use shadowme_core::{ProgressService, SynthesisConfig, SynthesisOrchestrator, VoiceCloneCache};
use shadowme_db::{SqliteProgressRepository, setup_test_database};

pub struct TestApp {
    pub router: Router,
    pub provider: Arc<FakeVoiceProvider>,
    pub orchestrator: Arc<SynthesisOrchestrator>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(SynthesisConfig::with_defaults()).await
    }

    pub async fn with_config(config: SynthesisConfig) -> Self {
        let provider = Arc::new(FakeVoiceProvider::new());
        let clock = Arc::new(ManualClock::at_epoch());
        let cache = Arc::new(VoiceCloneCache::new(config.cache_ttl));
        let orchestrator = Arc::new(SynthesisOrchestrator::new(
            provider.clone(),
            cache,
            clock.clone(),
            config,
        ));

        let pool = setup_test_database().await.unwrap();
        let progress = Arc::new(ProgressService::new(Arc::new(
            SqliteProgressRepository::new(pool),
        )));

        let ctx = AxumContext {
            synthesis: Arc::clone(&orchestrator),
            progress,
            clock: clock.clone(),
            provider_status: ProviderStatus {
                api_key_configured: true,
                masked_api_key: Some("sk_test_...".to_string()),
            },
        };

        Self {
            router: create_router(ctx, &CorsConfig::AllowAll),
            provider,
            orchestrator,
            clock,
        }
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(Method::GET, uri, Body::empty(), false).await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        self.send(Method::DELETE, uri, Body::empty(), false).await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response {
        self.send(Method::POST, uri, Body::from(body.to_string()), true)
            .await
    }

    async fn send(&self, method: Method, uri: &str, body: Body, json: bool) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        if json {
            request = request.header("content-type", "application/json");
        }
        self.router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap()
    }
}

/// A recording long enough to be cloned. Decodes to 120 zero bytes.
pub fn recording() -> String {
    format!("data:audio/webm;base64,{}", "A".repeat(160))
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

/// Assert the response body is valid JSON and return the parsed value.
pub async fn parse_json(response: Response) -> serde_json::Value {
    let body = body_bytes(response).await;
    serde_json::from_slice(&body).unwrap_or_else(|e| panic!("Expected valid JSON body: {e}"))
}

pub fn header<'a>(response: &'a Response, name: &str) -> &'a str {
    response
        .headers()
        .get(name)
        .map_or("", |v| v.to_str().unwrap_or(""))
}
