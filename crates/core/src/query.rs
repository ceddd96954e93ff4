//! Query engine: multi-criteria filtering and stable sorting.
//!
//! One contract for both entity types. Filters AND-combine the predicates
//! that are present; an empty filter passes everything through in input
//! order. Sorts are stable, and entities missing the sort key (no score
//! yet, not analyzed yet) always sort last regardless of direction.

use std::cmp::Ordering;

use serde::Deserialize;

use crate::entities::{
    AssetKind, AssetStatus, CreativeAsset, Impact, Platform, Recommendation,
    RecommendationCategory, RecommendationStatus,
};

// ---------------------------------------------------------------------------
// Sort keys
// ---------------------------------------------------------------------------

/// Field to sort a collection by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// `analyzed_at` for assets, `generated_at` for recommendations.
    Date,
    /// `overall_score`; entities without one sort last. Recommendations
    /// carry no score and fall back to date order.
    Score,
    /// Locale-naive lexicographic compare on `name`/`title`.
    Name,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Field predicates for asset queries. Absent fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetFilter {
    pub status: Option<AssetStatus>,
    pub platform: Option<Platform>,
    pub kind: Option<AssetKind>,
    /// Case-insensitive substring match on the asset name.
    pub name_contains: Option<String>,
}

impl AssetFilter {
    /// True when the asset passes every predicate that is present.
    pub fn matches(&self, asset: &CreativeAsset) -> bool {
        if let Some(status) = self.status {
            if asset.status != status {
                return false;
            }
        }
        if let Some(platform) = self.platform {
            if asset.platform != platform {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if asset.kind != kind {
                return false;
            }
        }
        if let Some(ref needle) = self.name_contains {
            if !contains_ignore_case(&asset.name, needle) {
                return false;
            }
        }
        true
    }
}

/// Field predicates for recommendation queries. Absent fields match
/// everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendationFilter {
    pub status: Option<RecommendationStatus>,
    pub category: Option<RecommendationCategory>,
    pub impact: Option<Impact>,
    /// Case-insensitive substring match on the recommendation title.
    pub title_contains: Option<String>,
}

impl RecommendationFilter {
    /// True when the recommendation passes every predicate that is present.
    pub fn matches(&self, rec: &Recommendation) -> bool {
        if let Some(status) = self.status {
            if rec.status != status {
                return false;
            }
        }
        if let Some(category) = self.category {
            if rec.category != category {
                return false;
            }
        }
        if let Some(impact) = self.impact {
            if rec.impact != impact {
                return false;
            }
        }
        if let Some(ref needle) = self.title_contains {
            if !contains_ignore_case(&rec.title, needle) {
                return false;
            }
        }
        true
    }
}

/// Case-insensitive substring test.
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Keep the assets matching `filter`, preserving input order.
pub fn filter_assets(assets: Vec<CreativeAsset>, filter: &AssetFilter) -> Vec<CreativeAsset> {
    assets.into_iter().filter(|a| filter.matches(a)).collect()
}

/// Keep the recommendations matching `filter`, preserving input order.
pub fn filter_recommendations(
    recs: Vec<Recommendation>,
    filter: &RecommendationFilter,
) -> Vec<Recommendation> {
    recs.into_iter().filter(|r| filter.matches(r)).collect()
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Stable in-place sort of assets by `key`/`order`.
pub fn sort_assets(assets: &mut [CreativeAsset], key: SortKey, order: SortOrder) {
    assets.sort_by(|a, b| match key {
        SortKey::Date => cmp_nulls_last(a.analyzed_at.as_ref(), b.analyzed_at.as_ref(), order),
        SortKey::Score => cmp_nulls_last(a.overall_score.as_ref(), b.overall_score.as_ref(), order),
        SortKey::Name => apply_order(a.name.cmp(&b.name), order),
    });
}

/// Stable in-place sort of recommendations by `key`/`order`.
pub fn sort_recommendations(recs: &mut [Recommendation], key: SortKey, order: SortOrder) {
    recs.sort_by(|a, b| match key {
        // Recommendations have no score; both Date and Score order by
        // generation time.
        SortKey::Date | SortKey::Score => {
            cmp_nulls_last(Some(&a.generated_at), Some(&b.generated_at), order)
        }
        SortKey::Name => apply_order(a.title.cmp(&b.title), order),
    });
}

/// Compare two optional keys: present values compare in `order`, missing
/// values sort last regardless of direction.
fn cmp_nulls_last<T: PartialOrd>(a: Option<&T>, b: Option<&T>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            apply_order(x.partial_cmp(y).unwrap_or(Ordering::Equal), order)
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn apply_order(ord: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ord,
        SortOrder::Desc => ord.reverse(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
