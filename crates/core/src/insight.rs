//! Pure aggregate and insight computation.
//!
//! Everything here operates on snapshots passed in by the caller; nothing
//! reads shared state. The campaign insight pass is a deterministic rules
//! sweep over metric snapshots, not a call to the analysis provider.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::CreativeAsset;
use crate::scoring::round_to_tenth;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum ROAS spread between the best and worst campaign before the gap
/// is worth surfacing.
pub const ROAS_GAP_THRESHOLD: f64 = 1.0;

/// A campaign is a high performer when its ROAS is at least this multiple
/// of the portfolio average.
pub const HIGH_PERFORMER_ROAS_FACTOR: f64 = 1.2;

// ---------------------------------------------------------------------------
// Asset aggregates
// ---------------------------------------------------------------------------

/// Grouping dimension for [`top_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Platform,
    Kind,
}

/// Mean `overall_score` across the analysis-complete assets, rounded to one
/// decimal. `None` means no asset has a score yet -- a defined "no data"
/// result, not an error.
pub fn average_score(assets: &[CreativeAsset]) -> Option<f64> {
    let scores: Vec<f64> = assets.iter().filter_map(|a| a.overall_score).collect();
    if scores.is_empty() {
        return None;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    Some(round_to_tenth(mean))
}

/// The group with the highest average score along `dimension`, with that
/// average. Ties break to the alphabetically-first group key. Groups are
/// formed from scored assets only; `None` when nothing is scored.
pub fn top_by(assets: &[CreativeAsset], dimension: Dimension) -> Option<(String, f64)> {
    // BTreeMap iterates keys alphabetically, so the strict `>` comparison
    // below resolves ties to the first key.
    let mut groups: BTreeMap<&'static str, (f64, usize)> = BTreeMap::new();
    for asset in assets {
        let Some(score) = asset.overall_score else {
            continue;
        };
        let key = match dimension {
            Dimension::Platform => asset.platform.as_str(),
            Dimension::Kind => asset.kind.as_str(),
        };
        let entry = groups.entry(key).or_insert((0.0, 0));
        entry.0 += score;
        entry.1 += 1;
    }

    let mut best: Option<(&'static str, f64)> = None;
    for (key, (sum, count)) in groups {
        let avg = round_to_tenth(sum / count as f64);
        match best {
            Some((_, best_avg)) if avg <= best_avg => {}
            _ => best = Some((key, avg)),
        }
    }
    best.map(|(key, avg)| (key.to_string(), avg))
}

/// Signed movement between two averages, rounded to one decimal.
pub fn trend_delta(current: f64, previous: f64) -> f64 {
    round_to_tenth(current - previous)
}

// ---------------------------------------------------------------------------
// Campaign insights
// ---------------------------------------------------------------------------

/// Point-in-time campaign metrics supplied by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignSnapshot {
    pub campaign_ref: String,
    /// Total spend in account currency.
    pub spend: f64,
    /// Attributed revenue in account currency.
    pub revenue: f64,
    pub conversions: u64,
}

impl CampaignSnapshot {
    /// Return on ad spend; zero when nothing was spent.
    pub fn roas(&self) -> f64 {
        if self.spend > 0.0 {
            self.revenue / self.spend
        } else {
            0.0
        }
    }
}

/// A derived, human-readable observation with a concrete next step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub title: String,
    pub description: String,
    pub action_item: String,
}

/// Deterministic rules pass over campaign metrics.
///
/// Rules, in emission order:
/// 1. Largest ROAS gap -- the spread between the best and worst campaign
///    (among those with spend) exceeds [`ROAS_GAP_THRESHOLD`].
/// 2. Under-allocated high performer -- a campaign whose ROAS is at least
///    [`HIGH_PERFORMER_ROAS_FACTOR`] times the average while its spend
///    share is below an equal split; the most under-allocated qualifying
///    campaign is reported.
///
/// Fewer than two spending campaigns yield no insights.
pub fn generate_insights(campaigns: &[CampaignSnapshot]) -> Vec<Insight> {
    let spending: Vec<&CampaignSnapshot> =
        campaigns.iter().filter(|c| c.spend > 0.0).collect();
    if spending.len() < 2 {
        return Vec::new();
    }

    let mut insights = Vec::new();

    // Rule 1: largest ROAS gap between best and worst.
    let best = spending
        .iter()
        .copied()
        .max_by(|a, b| {
            a.roas()
                .partial_cmp(&b.roas())
                .unwrap_or(std::cmp::Ordering::Equal)
                // Alphabetically-first wins ties: max_by keeps the later of
                // equal elements, so order equal ROAS by reversed name.
                .then_with(|| b.campaign_ref.cmp(&a.campaign_ref))
        })
        .expect("spending is non-empty");
    let worst = spending
        .iter()
        .copied()
        .min_by(|a, b| {
            a.roas()
                .partial_cmp(&b.roas())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.campaign_ref.cmp(&b.campaign_ref))
        })
        .expect("spending is non-empty");

    let gap = best.roas() - worst.roas();
    if gap >= ROAS_GAP_THRESHOLD && best.campaign_ref != worst.campaign_ref {
        insights.push(Insight {
            title: "Large ROAS gap between campaigns".to_string(),
            description: format!(
                "{} returns {:.1}x per unit of spend while {} returns {:.1}x.",
                best.campaign_ref,
                best.roas(),
                worst.campaign_ref,
                worst.roas()
            ),
            action_item: format!(
                "Shift budget from {} toward {}",
                worst.campaign_ref, best.campaign_ref
            ),
        });
    }

    // Rule 2: most under-allocated high performer.
    let total_spend: f64 = spending.iter().map(|c| c.spend).sum();
    let avg_roas: f64 =
        spending.iter().map(|c| c.roas()).sum::<f64>() / spending.len() as f64;
    let equal_share = 1.0 / spending.len() as f64;

    let mut under_allocated: Option<(&CampaignSnapshot, f64)> = None;
    for &campaign in &spending {
        let share = campaign.spend / total_spend;
        if campaign.roas() >= avg_roas * HIGH_PERFORMER_ROAS_FACTOR && share < equal_share {
            let replace = match under_allocated {
                Some((current, current_share)) => {
                    share < current_share
                        || (share == current_share
                            && campaign.campaign_ref < current.campaign_ref)
                }
                None => true,
            };
            if replace {
                under_allocated = Some((campaign, share));
            }
        }
    }

    if let Some((campaign, share)) = under_allocated {
        insights.push(Insight {
            title: "Under-allocated high performer".to_string(),
            description: format!(
                "{} delivers {:.1}x ROAS (portfolio average {:.1}x) on only {:.0}% of spend.",
                campaign.campaign_ref,
                campaign.roas(),
                avg_roas,
                share * 100.0
            ),
            action_item: format!("Increase budget for {}", campaign.campaign_ref),
        });
    }

    insights
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
