//! Creative asset and recommendation entities.
//!
//! Entities are constructed by the lifecycle manager only -- the `from_draft`
//! constructors validate caller input and fix the initial status. Everything
//! downstream receives an already-consistent entity.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::scoring::ScoreBreakdown;
use crate::types::{EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The media type of a creative asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Image,
    Video,
    Copy,
}

impl AssetKind {
    /// Stable label used for grouping and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Image => "image",
            AssetKind::Video => "video",
            AssetKind::Copy => "copy",
        }
    }
}

/// Advertising platform the asset runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Google,
    Facebook,
    Instagram,
    TikTok,
    Snapchat,
}

impl Platform {
    /// Stable label used for grouping and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Google => "google",
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::TikTok => "tiktok",
            Platform::Snapchat => "snapchat",
        }
    }
}

/// Creative asset lifecycle status.
///
/// `Analyzed` exists only for legacy data loaded from the persistent store:
/// no transition produces it and none leaves it. The live state machine is
/// `PendingAnalysis` -> one of the three score bands, or `PendingAnalysis`
/// -> `Failed`; `reanalyze` returns any of those four to `PendingAnalysis`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    PendingAnalysis,
    Analyzed,
    Excellent,
    Active,
    NeedsImprovement,
    Failed,
}

impl AssetStatus {
    /// Human-readable name for log fields and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            AssetStatus::PendingAnalysis => "pending_analysis",
            AssetStatus::Analyzed => "analyzed",
            AssetStatus::Excellent => "excellent",
            AssetStatus::Active => "active",
            AssetStatus::NeedsImprovement => "needs_improvement",
            AssetStatus::Failed => "failed",
        }
    }

    /// True for the statuses that carry a score breakdown.
    pub fn is_scored(self) -> bool {
        matches!(
            self,
            AssetStatus::Excellent | AssetStatus::Active | AssetStatus::NeedsImprovement
        )
    }

    /// True for statuses from which `reanalyze` is legal.
    pub fn can_reanalyze(self) -> bool {
        self.is_scored() || self == AssetStatus::Failed
    }
}

/// Recommendation lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Pending,
    Implemented,
    Rejected,
}

impl RecommendationStatus {
    /// Human-readable name for log fields and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            RecommendationStatus::Pending => "pending",
            RecommendationStatus::Implemented => "implemented",
            RecommendationStatus::Rejected => "rejected",
        }
    }
}

/// The outcome a pending recommendation is resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Implemented,
    Rejected,
}

impl Resolution {
    /// The terminal status this resolution maps to.
    pub fn status(self) -> RecommendationStatus {
        match self {
            Resolution::Implemented => RecommendationStatus::Implemented,
            Resolution::Rejected => RecommendationStatus::Rejected,
        }
    }
}

/// Category of a campaign recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    Budget,
    Bidding,
    Keywords,
    Creative,
    Schedule,
    Optimization,
}

/// Expected impact of implementing a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Low,
    Medium,
    High,
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// The creative content itself: a media URL for image/video assets, inline
/// text for ad copy. The enum makes "exactly one of url/content" impossible
/// to violate after draft validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetPayload {
    Url(String),
    Content(String),
}

// ---------------------------------------------------------------------------
// Creative asset
// ---------------------------------------------------------------------------

/// A single ad creative unit belonging to a campaign.
///
/// `overall_score` is derived from `score_breakdown` and never set by a
/// caller; both are present exactly when analysis has succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreativeAsset {
    pub id: EntityId,
    pub name: String,
    pub kind: AssetKind,
    pub platform: Platform,
    pub campaign_ref: String,
    pub payload: AssetPayload,
    pub created_at: Timestamp,
    pub analyzed_at: Option<Timestamp>,
    pub status: AssetStatus,
    pub score_breakdown: Option<ScoreBreakdown>,
    pub overall_score: Option<f64>,
    pub feedback: Vec<String>,
    pub improvements: Vec<String>,
}

impl CreativeAsset {
    /// Build a new asset in `PendingAnalysis` from a validated draft.
    ///
    /// Called by the lifecycle manager only.
    pub fn from_draft(draft: AssetDraft, now: Timestamp) -> Result<Self, CoreError> {
        let payload = draft.validate()?;
        Ok(Self {
            id: EntityId::new_v4(),
            name: draft.name,
            kind: draft.kind,
            platform: draft.platform,
            campaign_ref: draft.campaign_ref,
            payload,
            created_at: now,
            analyzed_at: None,
            status: AssetStatus::PendingAnalysis,
            score_breakdown: None,
            overall_score: None,
            feedback: Vec::new(),
            improvements: Vec::new(),
        })
    }
}

/// Caller-supplied input for `submit_asset`.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetDraft {
    pub name: String,
    pub kind: AssetKind,
    pub platform: Platform,
    pub campaign_ref: String,
    /// Media URL; required for image and video assets.
    pub url: Option<String>,
    /// Ad copy text; required for copy assets.
    pub content: Option<String>,
}

impl AssetDraft {
    /// Validate the draft and produce its payload.
    ///
    /// Rules:
    /// - `name` and `campaign_ref` must be non-empty.
    /// - Image/video assets carry a `url` and no `content`.
    /// - Copy assets carry `content` and no `url`.
    pub fn validate(&self) -> Result<AssetPayload, CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation(
                "Asset name must not be empty".to_string(),
            ));
        }
        if self.campaign_ref.trim().is_empty() {
            return Err(CoreError::Validation(
                "Campaign reference must not be empty".to_string(),
            ));
        }

        match self.kind {
            AssetKind::Image | AssetKind::Video => match (&self.url, &self.content) {
                (Some(url), None) if !url.trim().is_empty() => {
                    Ok(AssetPayload::Url(url.clone()))
                }
                (Some(_), Some(_)) => Err(CoreError::Validation(format!(
                    "{} assets must not carry inline content",
                    self.kind.as_str()
                ))),
                _ => Err(CoreError::Validation(format!(
                    "{} assets require a non-empty url",
                    self.kind.as_str()
                ))),
            },
            AssetKind::Copy => match (&self.url, &self.content) {
                (None, Some(content)) if !content.trim().is_empty() => {
                    Ok(AssetPayload::Content(content.clone()))
                }
                (Some(_), Some(_)) | (Some(_), None) => Err(CoreError::Validation(
                    "copy assets must not carry a url".to_string(),
                )),
                _ => Err(CoreError::Validation(
                    "copy assets require non-empty content".to_string(),
                )),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

/// A proposed optimization action tied to a campaign.
///
/// Resolved at most once; `resolved_at` is set exactly when the status has
/// left `Pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: EntityId,
    pub campaign_ref: String,
    pub title: String,
    pub description: String,
    pub category: RecommendationCategory,
    pub impact: Impact,
    pub status: RecommendationStatus,
    pub generated_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
    /// Metric name -> value pairs that justified the recommendation at
    /// generation time, kept for later before/after comparison.
    pub metric_snapshot: serde_json::Map<String, serde_json::Value>,
}

impl Recommendation {
    /// Build a new pending recommendation from a validated draft.
    ///
    /// Called by the lifecycle manager only.
    pub fn from_draft(draft: RecommendationDraft, now: Timestamp) -> Result<Self, CoreError> {
        draft.validate()?;
        Ok(Self {
            id: EntityId::new_v4(),
            campaign_ref: draft.campaign_ref,
            title: draft.title,
            description: draft.description,
            category: draft.category,
            impact: draft.impact,
            status: RecommendationStatus::Pending,
            generated_at: now,
            resolved_at: None,
            metric_snapshot: draft.metric_snapshot,
        })
    }
}

/// Caller-supplied input for `submit_recommendation`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationDraft {
    pub campaign_ref: String,
    pub title: String,
    pub description: String,
    pub category: RecommendationCategory,
    pub impact: Impact,
    #[serde(default)]
    pub metric_snapshot: serde_json::Map<String, serde_json::Value>,
}

impl RecommendationDraft {
    /// Validate the draft.
    ///
    /// Rules: `title` and `campaign_ref` must be non-empty.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation(
                "Recommendation title must not be empty".to_string(),
            ));
        }
        if self.campaign_ref.trim().is_empty() {
            return Err(CoreError::Validation(
                "Campaign reference must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
