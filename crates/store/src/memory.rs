//! In-memory authoritative entity collection.
//!
//! Each entity lives behind its own `Arc<Mutex<_>>` so transitions on
//! unrelated entities proceed fully in parallel; the outer `RwLock` guards
//! only map membership. Entities are inserted, never deleted -- the history
//! log records every status transition append-only.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use adlens_core::entities::{CreativeAsset, Recommendation};
use adlens_core::error::CoreError;
use adlens_core::types::{EntityId, Timestamp};

/// One recorded status transition.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionRecord {
    /// `"asset"` or `"recommendation"`.
    pub entity: &'static str,
    pub id: EntityId,
    pub from: &'static str,
    pub to: &'static str,
    pub at: Timestamp,
}

/// Authoritative in-memory collection of assets and recommendations.
///
/// Shared via `Arc<EntityStore>`; the lifecycle manager holds the only
/// mutating paths. Readers take point-in-time snapshots.
#[derive(Default)]
pub struct EntityStore {
    assets: RwLock<HashMap<EntityId, Arc<Mutex<CreativeAsset>>>>,
    recommendations: RwLock<HashMap<EntityId, Arc<Mutex<Recommendation>>>>,
    history: RwLock<Vec<TransitionRecord>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- assets ----

    /// Insert a new asset. Fails if the id is already present -- entities
    /// are created once and only transition afterwards.
    pub async fn insert_asset(&self, asset: CreativeAsset) -> Result<(), CoreError> {
        let mut assets = self.assets.write().await;
        if assets.contains_key(&asset.id) {
            return Err(CoreError::Validation(format!(
                "asset {} already exists",
                asset.id
            )));
        }
        assets.insert(asset.id, Arc::new(Mutex::new(asset)));
        Ok(())
    }

    /// Handle to a single asset's lock, for serialized read-modify-write.
    pub async fn asset_handle(&self, id: EntityId) -> Option<Arc<Mutex<CreativeAsset>>> {
        self.assets.read().await.get(&id).map(Arc::clone)
    }

    /// Point-in-time copy of one asset.
    pub async fn get_asset(&self, id: EntityId) -> Option<CreativeAsset> {
        let handle = self.asset_handle(id).await?;
        let asset = handle.lock().await;
        Some(asset.clone())
    }

    /// Point-in-time copy of every asset, ordered by creation time (id as
    /// tie-break) so snapshots are deterministic.
    pub async fn snapshot_assets(&self) -> Vec<CreativeAsset> {
        let handles: Vec<Arc<Mutex<CreativeAsset>>> =
            self.assets.read().await.values().map(Arc::clone).collect();
        let mut snapshot = Vec::with_capacity(handles.len());
        for handle in handles {
            snapshot.push(handle.lock().await.clone());
        }
        snapshot.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        snapshot
    }

    /// Number of stored assets.
    pub async fn asset_count(&self) -> usize {
        self.assets.read().await.len()
    }

    // ---- recommendations ----

    /// Insert a new recommendation. Fails if the id is already present.
    pub async fn insert_recommendation(&self, rec: Recommendation) -> Result<(), CoreError> {
        let mut recs = self.recommendations.write().await;
        if recs.contains_key(&rec.id) {
            return Err(CoreError::Validation(format!(
                "recommendation {} already exists",
                rec.id
            )));
        }
        recs.insert(rec.id, Arc::new(Mutex::new(rec)));
        Ok(())
    }

    /// Handle to a single recommendation's lock.
    pub async fn recommendation_handle(
        &self,
        id: EntityId,
    ) -> Option<Arc<Mutex<Recommendation>>> {
        self.recommendations.read().await.get(&id).map(Arc::clone)
    }

    /// Point-in-time copy of one recommendation.
    pub async fn get_recommendation(&self, id: EntityId) -> Option<Recommendation> {
        let handle = self.recommendation_handle(id).await?;
        let rec = handle.lock().await;
        Some(rec.clone())
    }

    /// Point-in-time copy of every recommendation, ordered by generation
    /// time (id as tie-break).
    pub async fn snapshot_recommendations(&self) -> Vec<Recommendation> {
        let handles: Vec<Arc<Mutex<Recommendation>>> = self
            .recommendations
            .read()
            .await
            .values()
            .map(Arc::clone)
            .collect();
        let mut snapshot = Vec::with_capacity(handles.len());
        for handle in handles {
            snapshot.push(handle.lock().await.clone());
        }
        snapshot.sort_by(|a, b| a.generated_at.cmp(&b.generated_at).then(a.id.cmp(&b.id)));
        snapshot
    }

    /// Number of stored recommendations.
    pub async fn recommendation_count(&self) -> usize {
        self.recommendations.read().await.len()
    }

    // ---- history ----

    /// Append a status transition to the history log.
    pub async fn record_transition(&self, record: TransitionRecord) {
        self.history.write().await.push(record);
    }

    /// Copy of the full transition history, oldest first.
    pub async fn history(&self) -> Vec<TransitionRecord> {
        self.history.read().await.clone()
    }

    /// Transition history for one entity, oldest first.
    pub async fn history_for(&self, id: EntityId) -> Vec<TransitionRecord> {
        self.history
            .read()
            .await
            .iter()
            .filter(|r| r.id == id)
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
