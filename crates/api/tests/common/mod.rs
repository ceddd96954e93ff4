//! Shared helpers for API integration tests.
//!
//! Builds the full application router around an in-memory engine and a
//! controllable analysis provider, mirroring the construction in `main.rs`
//! minus the network listener.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Request, Response};
use axum::Router;
use tokio::sync::Mutex;
use tower::ServiceExt;

use adlens_api::config::ServerConfig;
use adlens_api::routes;
use adlens_api::state::AppState;
use adlens_engine::{InsightAggregator, LifecycleManager};
use adlens_events::EventBus;
use adlens_gateway::{
    AnalysisGateway, AnalysisProvider, AnalysisRequest, GatewayConfig, ProviderError,
    ProviderResponse, RetryPolicy,
};
use adlens_store::{EntityStore, MemoryPersistence};

/// Provider that either plays back a script or hangs forever.
pub struct TestProvider {
    script: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    hang: bool,
}

impl TestProvider {
    pub fn scripted(script: Vec<Result<ProviderResponse, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            hang: false,
        })
    }

    /// Keeps submitted assets in `pending_analysis` for the whole test.
    pub fn hanging() -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            hang: true,
        })
    }
}

#[async_trait]
impl AnalysisProvider for TestProvider {
    async fn analyze(&self, _request: &AnalysisRequest) -> Result<ProviderResponse, ProviderError> {
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Transient("script exhausted".to_string())))
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        provider_url: "http://localhost:8200".to_string(),
        analysis_timeout_secs: 60,
        analysis_max_retries: 2,
        analysis_max_concurrency: 4,
    }
}

/// The router plus the event bus, for tests that wait on analysis.
pub struct TestApp {
    pub app: Router,
    pub bus: Arc<EventBus>,
}

/// Build the full application router around the given provider.
pub async fn build_test_app(provider: Arc<TestProvider>) -> TestApp {
    let store = Arc::new(EntityStore::new());
    let bus = Arc::new(EventBus::default());
    let gateway = Arc::new(AnalysisGateway::new(
        provider as Arc<dyn AnalysisProvider>,
        GatewayConfig {
            attempt_timeout: Duration::from_secs(60),
            max_concurrency: 4,
            retry: RetryPolicy {
                max_retries: 2,
                initial_backoff: Duration::from_millis(1),
                max_backoff: Duration::from_millis(4),
                multiplier: 2.0,
            },
        },
    ));
    let manager = LifecycleManager::start(
        Arc::clone(&store),
        gateway,
        Arc::new(MemoryPersistence::new()) as _,
        Arc::clone(&bus),
    )
    .await
    .expect("in-memory persistence load cannot fail");

    let state = AppState {
        manager: Arc::clone(&manager),
        aggregator: Arc::new(InsightAggregator::new(Arc::clone(&store))),
        config: Arc::new(test_config()),
    };

    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .with_state(state);

    TestApp { app, bus }
}

/// Issue a GET request against the router.
pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("request succeeds")
}

/// Issue a POST request with a JSON body against the router.
pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("request succeeds")
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    use http_body_util::BodyExt;
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}

/// A well-formed provider response: averages to 8.7, classifies `active`.
pub fn good_response() -> ProviderResponse {
    serde_json::from_value(serde_json::json!({
        "scores": {
            "relevance": 9.2,
            "engagement": 8.5,
            "clarity": 9.0,
            "brand_consistency": 8.0
        },
        "feedback": ["Strong visual hook"],
        "improvements": ["Shorten the headline"]
    }))
    .expect("static fixture deserializes")
}

/// A valid image asset submission body.
pub fn image_asset_body(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "kind": "image",
        "platform": "google",
        "campaign_ref": "C1",
        "url": "https://x/y.png"
    })
}

/// A valid recommendation submission body.
pub fn recommendation_body() -> serde_json::Value {
    serde_json::json!({
        "campaign_ref": "C1",
        "title": "Raise budget",
        "description": "Campaign is outperforming its allocation",
        "category": "budget",
        "impact": "high"
    })
}
