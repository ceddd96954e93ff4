//! Insight aggregator: read-only aggregates over store snapshots.
//!
//! Computes averages, top performers, status distributions, and trend
//! alerts on demand. Never mutates entities; the underlying math lives in
//! `adlens_core::insight` so it stays independently testable.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;

use adlens_core::insight::{
    average_score, generate_insights, top_by, trend_delta, CampaignSnapshot, Dimension, Insight,
};
use adlens_core::query::{filter_assets, AssetFilter};
use adlens_core::scoring::{classify_alert_severity, AlertSeverity};
use adlens_store::EntityStore;

/// A group key with its average score.
#[derive(Debug, Clone, Serialize)]
pub struct GroupAverage {
    pub key: String,
    pub average: f64,
}

/// Cross-asset aggregate view returned by [`InsightAggregator::summary`].
#[derive(Debug, Clone, Serialize)]
pub struct InsightSummary {
    pub total_assets: usize,
    pub analyzed_assets: usize,
    pub average_score: Option<f64>,
    pub top_platform: Option<GroupAverage>,
    pub top_kind: Option<GroupAverage>,
    /// Asset count per status label.
    pub status_counts: BTreeMap<&'static str, usize>,
}

/// A graded movement of the average score between two adjacent windows.
#[derive(Debug, Clone, Serialize)]
pub struct TrendAlert {
    pub severity: AlertSeverity,
    pub current_average: f64,
    pub previous_average: f64,
    pub delta: f64,
}

/// Computes read-only aggregates over snapshots of the entity store.
pub struct InsightAggregator {
    store: Arc<EntityStore>,
}

impl InsightAggregator {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    /// Aggregate view over the assets matching `filter`.
    pub async fn summary(&self, filter: &AssetFilter) -> InsightSummary {
        let assets = filter_assets(self.store.snapshot_assets().await, filter);

        let mut status_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        for asset in &assets {
            *status_counts.entry(asset.status.as_str()).or_insert(0) += 1;
        }

        InsightSummary {
            total_assets: assets.len(),
            analyzed_assets: assets.iter().filter(|a| a.overall_score.is_some()).count(),
            average_score: average_score(&assets),
            top_platform: top_by(&assets, Dimension::Platform)
                .map(|(key, average)| GroupAverage { key, average }),
            top_kind: top_by(&assets, Dimension::Kind)
                .map(|(key, average)| GroupAverage { key, average }),
            status_counts,
        }
    }

    /// Compare the average score of assets analyzed in the last `window`
    /// against the window before it, graded by `threshold`.
    ///
    /// `None` when either window has no analyzed assets -- a trend needs
    /// two data points.
    pub async fn score_trend(&self, window: Duration, threshold: f64) -> Option<TrendAlert> {
        let now = Utc::now();
        let assets = self.store.snapshot_assets().await;

        let current: Vec<_> = assets
            .iter()
            .filter(|a| {
                a.analyzed_at
                    .map(|at| at > now - window)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        let previous: Vec<_> = assets
            .iter()
            .filter(|a| {
                a.analyzed_at
                    .map(|at| at <= now - window && at > now - window - window)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        let current_average = average_score(&current)?;
        let previous_average = average_score(&previous)?;
        let delta = trend_delta(current_average, previous_average);

        Some(TrendAlert {
            severity: classify_alert_severity(delta, threshold),
            current_average,
            previous_average,
            delta,
        })
    }

    /// Deterministic rules pass over caller-supplied campaign metrics.
    pub fn campaign_insights(&self, campaigns: &[CampaignSnapshot]) -> Vec<Insight> {
        generate_insights(campaigns)
    }
}
