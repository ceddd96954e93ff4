//! Persistent store collaborator contract.
//!
//! The engine is persistence-agnostic: it loads once at startup and writes
//! through after every transition. The backing store is expected to be
//! idempotent on `(id, status, analyzed_at/resolved_at)`, so at-least-once
//! delivery of saves is sufficient.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use adlens_core::entities::{CreativeAsset, Recommendation};
use adlens_core::types::EntityId;

/// Everything the durable store holds, returned by [`PersistentStore::load`].
#[derive(Debug, Default)]
pub struct StoreContents {
    pub assets: Vec<CreativeAsset>,
    pub recommendations: Vec<Recommendation>,
}

/// Errors surfaced by a persistence backend.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// External durable storage consumed by the engine.
///
/// `save_*` is called after every transition (write-through). Failures are
/// logged by the caller and do not unwind the in-memory state.
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Load all persisted entities at startup.
    async fn load(&self) -> Result<StoreContents, PersistError>;

    /// Persist the current state of one asset.
    async fn save_asset(&self, asset: &CreativeAsset) -> Result<(), PersistError>;

    /// Persist the current state of one recommendation.
    async fn save_recommendation(&self, rec: &Recommendation) -> Result<(), PersistError>;
}

/// In-memory [`PersistentStore`] used by tests and as a default backend.
///
/// Keeps the last saved state per entity id, which is exactly the
/// idempotency the contract asks of a real backend.
#[derive(Default)]
pub struct MemoryPersistence {
    assets: Mutex<HashMap<EntityId, CreativeAsset>>,
    recommendations: Mutex<HashMap<EntityId, Recommendation>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct assets ever saved.
    pub async fn saved_asset_count(&self) -> usize {
        self.assets.lock().await.len()
    }

    /// Last saved state of one asset, if any.
    pub async fn saved_asset(&self, id: EntityId) -> Option<CreativeAsset> {
        self.assets.lock().await.get(&id).cloned()
    }

    /// Last saved state of one recommendation, if any.
    pub async fn saved_recommendation(&self, id: EntityId) -> Option<Recommendation> {
        self.recommendations.lock().await.get(&id).cloned()
    }
}

#[async_trait]
impl PersistentStore for MemoryPersistence {
    async fn load(&self) -> Result<StoreContents, PersistError> {
        Ok(StoreContents {
            assets: self.assets.lock().await.values().cloned().collect(),
            recommendations: self
                .recommendations
                .lock()
                .await
                .values()
                .cloned()
                .collect(),
        })
    }

    async fn save_asset(&self, asset: &CreativeAsset) -> Result<(), PersistError> {
        self.assets.lock().await.insert(asset.id, asset.clone());
        Ok(())
    }

    async fn save_recommendation(&self, rec: &Recommendation) -> Result<(), PersistError> {
        self.recommendations.lock().await.insert(rec.id, rec.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use adlens_core::entities::{AssetDraft, AssetKind, AssetStatus, Platform};

    use super::*;

    fn new_asset() -> CreativeAsset {
        CreativeAsset::from_draft(
            AssetDraft {
                name: "a".to_string(),
                kind: AssetKind::Image,
                platform: Platform::Google,
                campaign_ref: "C1".to_string(),
                url: Some("https://x/y.png".to_string()),
                content: None,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn save_is_idempotent_per_id() {
        let persistence = MemoryPersistence::new();
        let mut asset = new_asset();
        persistence.save_asset(&asset).await.unwrap();

        asset.status = AssetStatus::Failed;
        persistence.save_asset(&asset).await.unwrap();

        assert_eq!(persistence.saved_asset_count().await, 1);
        assert_eq!(
            persistence.saved_asset(asset.id).await.unwrap().status,
            AssetStatus::Failed
        );
    }

    #[tokio::test]
    async fn load_round_trips_saved_entities() {
        let persistence = MemoryPersistence::new();
        let asset = new_asset();
        persistence.save_asset(&asset).await.unwrap();

        let contents = persistence.load().await.unwrap();
        assert_eq!(contents.assets.len(), 1);
        assert_eq!(contents.assets[0].id, asset.id);
        assert!(contents.recommendations.is_empty());
    }
}
