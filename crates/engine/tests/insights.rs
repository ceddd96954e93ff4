//! Insight aggregator integration tests over a hand-seeded store.

use std::sync::Arc;

use chrono::{Duration, Utc};

use adlens_core::entities::{
    AssetKind, AssetPayload, AssetStatus, CreativeAsset, Platform,
};
use adlens_core::insight::CampaignSnapshot;
use adlens_core::query::AssetFilter;
use adlens_core::scoring::{classify_score, AlertSeverity};
use adlens_core::types::EntityId;
use adlens_engine::InsightAggregator;
use adlens_store::EntityStore;

fn scored_asset(
    platform: Platform,
    kind: AssetKind,
    score: f64,
    analyzed_hours_ago: i64,
) -> CreativeAsset {
    CreativeAsset {
        id: EntityId::new_v4(),
        name: "asset".to_string(),
        kind,
        platform,
        campaign_ref: "C1".to_string(),
        payload: AssetPayload::Url("https://x/y.png".to_string()),
        created_at: Utc::now() - Duration::hours(analyzed_hours_ago + 1),
        analyzed_at: Some(Utc::now() - Duration::hours(analyzed_hours_ago)),
        status: classify_score(score),
        score_breakdown: None,
        overall_score: Some(score),
        feedback: Vec::new(),
        improvements: Vec::new(),
    }
}

fn pending_asset() -> CreativeAsset {
    CreativeAsset {
        analyzed_at: None,
        status: AssetStatus::PendingAnalysis,
        overall_score: None,
        ..scored_asset(Platform::Google, AssetKind::Image, 5.0, 0)
    }
}

async fn seeded_store(assets: Vec<CreativeAsset>) -> Arc<EntityStore> {
    let store = Arc::new(EntityStore::new());
    for asset in assets {
        store.insert_asset(asset).await.unwrap();
    }
    store
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[tokio::test]
async fn summary_over_mixed_assets() {
    let store = seeded_store(vec![
        scored_asset(Platform::Google, AssetKind::Image, 9.5, 1),
        scored_asset(Platform::Google, AssetKind::Video, 8.5, 1),
        scored_asset(Platform::Facebook, AssetKind::Image, 4.0, 1),
        pending_asset(),
    ])
    .await;
    let aggregator = InsightAggregator::new(store);

    let summary = aggregator.summary(&AssetFilter::default()).await;

    assert_eq!(summary.total_assets, 4);
    assert_eq!(summary.analyzed_assets, 3);
    // (9.5 + 8.5 + 4.0) / 3 = 7.333... -> 7.3
    assert_eq!(summary.average_score, Some(7.3));

    let top_platform = summary.top_platform.unwrap();
    assert_eq!(top_platform.key, "google");
    assert_eq!(top_platform.average, 9.0);

    // image averages (9.5 + 4.0) / 2 = 6.8; video stands at 8.5.
    let top_kind = summary.top_kind.unwrap();
    assert_eq!(top_kind.key, "video");
    assert_eq!(top_kind.average, 8.5);

    assert_eq!(summary.status_counts.get("pending_analysis"), Some(&1));
    assert_eq!(summary.status_counts.get("excellent"), Some(&1));
    assert_eq!(summary.status_counts.get("active"), Some(&1));
    assert_eq!(summary.status_counts.get("needs_improvement"), Some(&1));
}

#[tokio::test]
async fn summary_respects_filter() {
    let store = seeded_store(vec![
        scored_asset(Platform::Google, AssetKind::Image, 9.0, 1),
        scored_asset(Platform::Facebook, AssetKind::Image, 5.0, 1),
    ])
    .await;
    let aggregator = InsightAggregator::new(store);

    let filter = AssetFilter {
        platform: Some(Platform::Google),
        ..Default::default()
    };
    let summary = aggregator.summary(&filter).await;

    assert_eq!(summary.total_assets, 1);
    assert_eq!(summary.average_score, Some(9.0));
}

#[tokio::test]
async fn summary_over_empty_store_has_no_data() {
    let aggregator = InsightAggregator::new(Arc::new(EntityStore::new()));
    let summary = aggregator.summary(&AssetFilter::default()).await;

    assert_eq!(summary.total_assets, 0);
    assert_eq!(summary.average_score, None);
    assert!(summary.top_platform.is_none());
    assert!(summary.top_kind.is_none());
    assert!(summary.status_counts.is_empty());
}

// ---------------------------------------------------------------------------
// Score trend
// ---------------------------------------------------------------------------

#[tokio::test]
async fn improving_trend_grades_success() {
    let store = seeded_store(vec![
        // Current 24h window.
        scored_asset(Platform::Google, AssetKind::Image, 9.0, 2),
        // Previous window (24h-48h ago).
        scored_asset(Platform::Google, AssetKind::Image, 7.0, 30),
    ])
    .await;
    let aggregator = InsightAggregator::new(store);

    let alert = aggregator
        .score_trend(Duration::hours(24), 0.5)
        .await
        .unwrap();

    assert_eq!(alert.current_average, 9.0);
    assert_eq!(alert.previous_average, 7.0);
    assert_eq!(alert.delta, 2.0);
    assert_eq!(alert.severity, AlertSeverity::Success);
}

#[tokio::test]
async fn declining_trend_grades_warning() {
    let store = seeded_store(vec![
        scored_asset(Platform::Google, AssetKind::Image, 6.0, 2),
        scored_asset(Platform::Google, AssetKind::Image, 8.0, 30),
    ])
    .await;
    let aggregator = InsightAggregator::new(store);

    let alert = aggregator
        .score_trend(Duration::hours(24), 0.5)
        .await
        .unwrap();
    assert_eq!(alert.severity, AlertSeverity::Warning);
}

#[tokio::test]
async fn flat_trend_grades_info() {
    let store = seeded_store(vec![
        scored_asset(Platform::Google, AssetKind::Image, 8.1, 2),
        scored_asset(Platform::Google, AssetKind::Image, 8.0, 30),
    ])
    .await;
    let aggregator = InsightAggregator::new(store);

    let alert = aggregator
        .score_trend(Duration::hours(24), 0.5)
        .await
        .unwrap();
    assert_eq!(alert.severity, AlertSeverity::Info);
}

#[tokio::test]
async fn trend_needs_both_windows() {
    // Only current-window data.
    let store = seeded_store(vec![scored_asset(
        Platform::Google,
        AssetKind::Image,
        8.0,
        2,
    )])
    .await;
    let aggregator = InsightAggregator::new(store);

    assert!(aggregator
        .score_trend(Duration::hours(24), 0.5)
        .await
        .is_none());
}

// ---------------------------------------------------------------------------
// Campaign insights
// ---------------------------------------------------------------------------

#[tokio::test]
async fn campaign_insights_delegate_to_rules_pass() {
    let aggregator = InsightAggregator::new(Arc::new(EntityStore::new()));
    let insights = aggregator.campaign_insights(&[
        CampaignSnapshot {
            campaign_ref: "Brand".to_string(),
            spend: 100.0,
            revenue: 450.0,
            conversions: 40,
        },
        CampaignSnapshot {
            campaign_ref: "Retargeting".to_string(),
            spend: 100.0,
            revenue: 120.0,
            conversions: 10,
        },
    ]);

    assert!(!insights.is_empty());
    assert_eq!(insights[0].title, "Large ROAS gap between campaigns");
}
