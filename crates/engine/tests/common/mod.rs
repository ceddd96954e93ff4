//! Shared test harness: an engine wired to a controllable provider and
//! in-memory persistence.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use adlens_engine::LifecycleManager;
use adlens_events::{EngineEvent, EventBus, EventKind};
use adlens_gateway::{
    AnalysisGateway, AnalysisProvider, AnalysisRequest, GatewayConfig, ProviderError,
    ProviderResponse, RetryPolicy,
};
use adlens_store::{EntityStore, MemoryPersistence};

use adlens_core::entities::{
    AssetDraft, AssetKind, Impact, Platform, RecommendationCategory, RecommendationDraft,
};

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

    /// A provider whose calls never complete; keeps assets in
    /// `PendingAnalysis` so transitions can be driven by hand.
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

/// Fully wired engine plus handles to its collaborators.
pub struct Harness {
    pub manager: Arc<LifecycleManager>,
    pub store: Arc<EntityStore>,
    pub persistence: Arc<MemoryPersistence>,
    pub bus: Arc<EventBus>,
}

/// Build an engine around the given provider with fast retry timings.
pub async fn harness(provider: Arc<TestProvider>) -> Harness {
    let store = Arc::new(EntityStore::new());
    let persistence = Arc::new(MemoryPersistence::new());
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
        Arc::clone(&persistence) as _,
        Arc::clone(&bus),
    )
    .await
    .expect("in-memory persistence load cannot fail");

    Harness {
        manager,
        store,
        persistence,
        bus,
    }
}

/// A well-formed provider response: sub-scores {9.2, 8.5, 9.0, 8.0},
/// which average to 8.7 and classify as `active`.
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

pub fn image_draft(name: &str) -> AssetDraft {
    AssetDraft {
        name: name.to_string(),
        kind: AssetKind::Image,
        platform: Platform::Google,
        campaign_ref: "C1".to_string(),
        url: Some("https://x/y.png".to_string()),
        content: None,
    }
}

pub fn budget_recommendation() -> RecommendationDraft {
    RecommendationDraft {
        campaign_ref: "C1".to_string(),
        title: "Raise budget".to_string(),
        description: "Campaign is outperforming its allocation".to_string(),
        category: RecommendationCategory::Budget,
        impact: Impact::High,
        metric_snapshot: serde_json::Map::new(),
    }
}

/// Wait until an event of `kind` arrives, or panic after two seconds.
pub async fn wait_for_event(
    rx: &mut tokio::sync::broadcast::Receiver<EngineEvent>,
    kind: EventKind,
) -> EngineEvent {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let event = rx.recv().await.expect("bus closed");
            if event.kind == kind {
                return event;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {kind:?}"))
}
