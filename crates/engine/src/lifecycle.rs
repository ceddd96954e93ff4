//! Lifecycle manager: entity creation and status transitions.
//!
//! The only component allowed to mutate status. Submission returns as soon
//! as the entity is validated and stored; analysis runs on a spawned task
//! per asset, bounded by the gateway. Per-asset locks make transitions on
//! one asset totally ordered while unrelated assets proceed in parallel.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use adlens_core::entities::{
    AssetDraft, AssetStatus, CreativeAsset, Recommendation, RecommendationDraft,
    RecommendationStatus, Resolution,
};
use adlens_core::error::CoreError;
use adlens_core::scoring::{classify_score, overall_score};
use adlens_core::types::EntityId;
use adlens_events::{EngineEvent, EventBus, EventKind};
use adlens_gateway::{AnalysisError, AnalysisGateway, AnalysisOutcome, AnalysisRequest};
use adlens_store::{EntityStore, PersistError, PersistentStore, TransitionRecord};

/// How long shutdown waits for in-flight analyses to drain.
const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one analysis run, fed back into the lifecycle.
#[derive(Debug)]
pub enum AnalysisResult {
    Scored(AnalysisOutcome),
    Failed(AnalysisError),
}

/// Bookkeeping for one in-flight analysis attempt.
///
/// The generation distinguishes the current attempt from a superseded one:
/// a task whose generation no longer matches the map entry arrived late
/// (the asset was resolved by hand and re-analyzed meanwhile) and must
/// discard its result.
struct InflightAnalysis {
    token: CancellationToken,
    generation: u64,
}

/// Sole authority for entity creation and status transitions.
///
/// Shared via `Arc<LifecycleManager>`; submission spawns analysis tasks
/// onto an internal tracker so shutdown can drain them.
pub struct LifecycleManager {
    store: Arc<EntityStore>,
    gateway: Arc<AnalysisGateway>,
    persistence: Arc<dyn PersistentStore>,
    bus: Arc<EventBus>,
    /// Master cancellation token -- cancelled during shutdown.
    cancel: CancellationToken,
    /// Analyses currently in flight, by asset id.
    inflight: Mutex<HashMap<EntityId, InflightAnalysis>>,
    next_generation: AtomicU64,
    tasks: TaskTracker,
}

impl LifecycleManager {
    /// Load persisted entities into the store and return a shared handle.
    pub async fn start(
        store: Arc<EntityStore>,
        gateway: Arc<AnalysisGateway>,
        persistence: Arc<dyn PersistentStore>,
        bus: Arc<EventBus>,
    ) -> Result<Arc<Self>, PersistError> {
        let contents = persistence.load().await?;
        let (asset_count, rec_count) = (contents.assets.len(), contents.recommendations.len());

        for asset in contents.assets {
            if let Err(e) = store.insert_asset(asset).await {
                tracing::warn!(error = %e, "Skipping duplicate persisted asset");
            }
        }
        for rec in contents.recommendations {
            if let Err(e) = store.insert_recommendation(rec).await {
                tracing::warn!(error = %e, "Skipping duplicate persisted recommendation");
            }
        }
        tracing::info!(asset_count, rec_count, "Loaded entities from persistent store");

        Ok(Arc::new(Self {
            store,
            gateway,
            persistence,
            bus,
            cancel: CancellationToken::new(),
            inflight: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
            tasks: TaskTracker::new(),
        }))
    }

    /// The entity store backing this manager.
    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    // ---- assets ----

    /// Validate and create a new asset in `PendingAnalysis`, then enqueue
    /// analysis. Returns without waiting for analysis to complete.
    pub async fn submit_asset(
        self: &Arc<Self>,
        draft: AssetDraft,
    ) -> Result<CreativeAsset, CoreError> {
        let asset = CreativeAsset::from_draft(draft, Utc::now())?;
        self.store.insert_asset(asset.clone()).await?;
        self.save_asset(&asset).await;
        self.bus.publish(
            EngineEvent::new(EventKind::AssetSubmitted, asset.id).with_detail(
                serde_json::json!({ "campaign_ref": asset.campaign_ref }),
            ),
        );
        tracing::info!(
            asset_id = %asset.id,
            campaign_ref = %asset.campaign_ref,
            kind = asset.kind.as_str(),
            "Asset submitted",
        );

        self.spawn_analysis(asset.clone()).await;
        Ok(asset)
    }

    /// Apply an analysis result to a pending asset.
    ///
    /// Legal only while the asset is in `PendingAnalysis`; a duplicate or
    /// late result fails with `InvalidTransition` and must be discarded by
    /// the caller rather than applied.
    pub async fn apply_analysis_result(
        &self,
        id: EntityId,
        result: AnalysisResult,
    ) -> Result<CreativeAsset, CoreError> {
        let handle = self
            .store
            .asset_handle(id)
            .await
            .ok_or(CoreError::NotFound { entity: "asset", id })?;
        let mut asset = handle.lock().await;

        if asset.status != AssetStatus::PendingAnalysis {
            return Err(CoreError::InvalidTransition {
                entity: "asset",
                id,
                detail: format!(
                    "analysis result received in status {}",
                    asset.status.as_str()
                ),
            });
        }

        let from = asset.status.as_str();
        let now = Utc::now();

        let event = match result {
            AnalysisResult::Scored(outcome) => {
                let overall = overall_score(&outcome.breakdown)?;
                let status = classify_score(overall);
                asset.score_breakdown = Some(outcome.breakdown);
                asset.overall_score = Some(overall);
                asset.analyzed_at = Some(now);
                asset.status = status;
                asset.feedback = outcome.feedback;
                asset.improvements = outcome.improvements;
                tracing::info!(
                    asset_id = %id,
                    overall_score = overall,
                    status = status.as_str(),
                    "Asset analyzed",
                );
                EngineEvent::new(EventKind::AssetAnalyzed, id).with_detail(serde_json::json!({
                    "overall_score": overall,
                    "status": status.as_str(),
                }))
            }
            AnalysisResult::Failed(error) => {
                asset.status = AssetStatus::Failed;
                asset.analyzed_at = Some(now);
                asset.feedback.push(format!("analysis failed: {}", error.reason));
                tracing::warn!(
                    asset_id = %id,
                    reason = %error.reason,
                    "Asset analysis failed",
                );
                EngineEvent::new(EventKind::AssetAnalysisFailed, id).with_detail(
                    serde_json::json!({ "reason": error.reason.to_string() }),
                )
            }
        };

        self.store
            .record_transition(TransitionRecord {
                entity: "asset",
                id,
                from,
                to: asset.status.as_str(),
                at: now,
            })
            .await;

        let snapshot = asset.clone();
        drop(asset);

        self.save_asset(&snapshot).await;
        self.bus.publish(event);
        Ok(snapshot)
    }

    /// Reset a scored or failed asset to `PendingAnalysis` and re-enqueue
    /// analysis. Prior scores, feedback, and the analysis timestamp are
    /// cleared.
    pub async fn reanalyze(self: &Arc<Self>, id: EntityId) -> Result<CreativeAsset, CoreError> {
        let handle = self
            .store
            .asset_handle(id)
            .await
            .ok_or(CoreError::NotFound { entity: "asset", id })?;
        let mut asset = handle.lock().await;

        if !asset.status.can_reanalyze() {
            return Err(CoreError::InvalidTransition {
                entity: "asset",
                id,
                detail: format!("reanalyze requested in status {}", asset.status.as_str()),
            });
        }

        let from = asset.status.as_str();
        let now = Utc::now();
        asset.status = AssetStatus::PendingAnalysis;
        asset.score_breakdown = None;
        asset.overall_score = None;
        asset.analyzed_at = None;
        asset.feedback.clear();
        asset.improvements.clear();

        self.store
            .record_transition(TransitionRecord {
                entity: "asset",
                id,
                from,
                to: asset.status.as_str(),
                at: now,
            })
            .await;

        let snapshot = asset.clone();
        drop(asset);

        self.save_asset(&snapshot).await;
        self.bus
            .publish(EngineEvent::new(EventKind::AssetReanalyzed, id));
        tracing::info!(asset_id = %id, "Asset queued for re-analysis");

        self.spawn_analysis(snapshot.clone()).await;
        Ok(snapshot)
    }

    /// Cancel an in-flight analysis. The spawned task observes the token
    /// and lands the asset in `Failed` with a cancellation reason.
    pub async fn cancel_analysis(&self, id: EntityId) -> Result<(), CoreError> {
        if self.store.asset_handle(id).await.is_none() {
            return Err(CoreError::NotFound { entity: "asset", id });
        }
        let inflight = self.inflight.lock().await;
        match inflight.get(&id) {
            Some(entry) => {
                entry.token.cancel();
                tracing::info!(asset_id = %id, "Analysis cancellation requested");
                Ok(())
            }
            None => Err(CoreError::InvalidTransition {
                entity: "asset",
                id,
                detail: "no analysis in flight".to_string(),
            }),
        }
    }

    // ---- recommendations ----

    /// Validate and create a new pending recommendation.
    pub async fn submit_recommendation(
        &self,
        draft: RecommendationDraft,
    ) -> Result<Recommendation, CoreError> {
        let rec = Recommendation::from_draft(draft, Utc::now())?;
        self.store.insert_recommendation(rec.clone()).await?;
        self.save_recommendation(&rec).await;
        self.bus.publish(
            EngineEvent::new(EventKind::RecommendationSubmitted, rec.id).with_detail(
                serde_json::json!({ "campaign_ref": rec.campaign_ref }),
            ),
        );
        tracing::info!(
            recommendation_id = %rec.id,
            campaign_ref = %rec.campaign_ref,
            "Recommendation submitted",
        );
        Ok(rec)
    }

    /// Resolve a pending recommendation. Recommendations resolve at most
    /// once -- a second resolution always fails, never silently succeeds.
    pub async fn resolve_recommendation(
        &self,
        id: EntityId,
        resolution: Resolution,
    ) -> Result<Recommendation, CoreError> {
        let handle = self.store.recommendation_handle(id).await.ok_or(
            CoreError::NotFound {
                entity: "recommendation",
                id,
            },
        )?;
        let mut rec = handle.lock().await;

        if rec.status != RecommendationStatus::Pending {
            return Err(CoreError::InvalidTransition {
                entity: "recommendation",
                id,
                detail: format!("already resolved to {}", rec.status.as_str()),
            });
        }

        let from = rec.status.as_str();
        let now = Utc::now();
        rec.status = resolution.status();
        rec.resolved_at = Some(now);

        self.store
            .record_transition(TransitionRecord {
                entity: "recommendation",
                id,
                from,
                to: rec.status.as_str(),
                at: now,
            })
            .await;

        let snapshot = rec.clone();
        drop(rec);

        self.save_recommendation(&snapshot).await;
        self.bus.publish(
            EngineEvent::new(EventKind::RecommendationResolved, id).with_detail(
                serde_json::json!({ "status": snapshot.status.as_str() }),
            ),
        );
        tracing::info!(
            recommendation_id = %id,
            status = snapshot.status.as_str(),
            "Recommendation resolved",
        );
        Ok(snapshot)
    }

    // ---- shutdown ----

    /// Cancel all in-flight analyses and wait for their tasks to drain.
    ///
    /// Cancelled analyses land their assets in `Failed` before the tasks
    /// exit, so nothing is left orphaned in `PendingAnalysis`.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down lifecycle manager");
        self.cancel.cancel();
        self.tasks.close();
        if tokio::time::timeout(SHUTDOWN_DRAIN_TIMEOUT, self.tasks.wait())
            .await
            .is_err()
        {
            tracing::warn!("Timed out waiting for analysis tasks to drain");
        }
    }

    // ---- private helpers ----

    /// Spawn the out-of-band analysis task for one pending asset.
    async fn spawn_analysis(self: &Arc<Self>, asset: CreativeAsset) {
        let token = self.cancel.child_token();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        self.inflight.lock().await.insert(
            asset.id,
            InflightAnalysis {
                token: token.clone(),
                generation,
            },
        );

        let manager = Arc::clone(self);
        self.tasks.spawn(async move {
            let request = AnalysisRequest {
                kind: asset.kind,
                platform: asset.platform,
                campaign_ref: asset.campaign_ref.clone(),
                payload: asset.payload.clone(),
            };

            let result = match manager.gateway.analyze(&request, &token).await {
                Ok(outcome) => AnalysisResult::Scored(outcome),
                Err(error) => AnalysisResult::Failed(error),
            };

            // Only the attempt that still owns the in-flight entry may
            // apply its result. A mismatched generation means a newer
            // attempt replaced this one while the provider call was
            // outstanding.
            {
                let mut inflight = manager.inflight.lock().await;
                match inflight.get(&asset.id) {
                    Some(entry) if entry.generation == generation => {
                        inflight.remove(&asset.id);
                    }
                    _ => {
                        tracing::warn!(
                            asset_id = %asset.id,
                            "Discarding superseded analysis result",
                        );
                        return;
                    }
                }
            }

            match manager.apply_analysis_result(asset.id, result).await {
                Ok(_) => {}
                Err(CoreError::InvalidTransition { .. }) => {
                    tracing::warn!(
                        asset_id = %asset.id,
                        "Discarding late analysis result",
                    );
                }
                Err(e) => {
                    tracing::error!(
                        asset_id = %asset.id,
                        error = %e,
                        "Failed to apply analysis result",
                    );
                }
            }
        });
    }

    /// Write-through save. Failures are logged, not propagated -- the store
    /// collaborator is idempotent and at-least-once, and the in-memory
    /// state is authoritative.
    async fn save_asset(&self, asset: &CreativeAsset) {
        if let Err(e) = self.persistence.save_asset(asset).await {
            tracing::error!(asset_id = %asset.id, error = %e, "Write-through save failed");
        }
    }

    async fn save_recommendation(&self, rec: &Recommendation) {
        if let Err(e) = self.persistence.save_recommendation(rec).await {
            tracing::error!(
                recommendation_id = %rec.id,
                error = %e,
                "Write-through save failed",
            );
        }
    }
}
