//! Snapshot queries: filter + sort over the entity store.
//!
//! Thin glue between the store's point-in-time snapshots and the pure
//! query engine in `adlens-core`. Used by both the insight aggregator and
//! external consumers.

use adlens_core::entities::{CreativeAsset, Recommendation};
use adlens_core::query::{
    filter_assets, filter_recommendations, sort_assets, sort_recommendations, AssetFilter,
    RecommendationFilter, SortKey, SortOrder,
};
use adlens_store::EntityStore;

/// Filter and optionally sort a snapshot of all assets.
pub async fn query_assets(
    store: &EntityStore,
    filter: &AssetFilter,
    sort: Option<(SortKey, SortOrder)>,
) -> Vec<CreativeAsset> {
    let snapshot = store.snapshot_assets().await;
    let mut result = filter_assets(snapshot, filter);
    if let Some((key, order)) = sort {
        sort_assets(&mut result, key, order);
    }
    result
}

/// Filter and optionally sort a snapshot of all recommendations.
pub async fn query_recommendations(
    store: &EntityStore,
    filter: &RecommendationFilter,
    sort: Option<(SortKey, SortOrder)>,
) -> Vec<Recommendation> {
    let snapshot = store.snapshot_recommendations().await;
    let mut result = filter_recommendations(snapshot, filter);
    if let Some((key, order)) = sort {
        sort_recommendations(&mut result, key, order);
    }
    result
}
