//! Scoring and classification rules.
//!
//! Pure, deterministic functions: compute the overall score from a
//! four-dimension breakdown, map an overall score to a status band, and
//! grade metric deltas into alert severities. All thresholds are named
//! constants so the bands live in exactly one place.

use serde::{Deserialize, Serialize};

use crate::entities::AssetStatus;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lower bound of every sub-score and overall score.
pub const SCORE_MIN: f64 = 0.0;

/// Upper bound of every sub-score and overall score.
pub const SCORE_MAX: f64 = 10.0;

/// Overall scores at or above this are classified `Excellent`.
pub const EXCELLENT_THRESHOLD: f64 = 9.0;

/// Overall scores at or above this (and below excellent) are `Active`.
pub const ACTIVE_THRESHOLD: f64 = 6.0;

// ---------------------------------------------------------------------------
// Score breakdown
// ---------------------------------------------------------------------------

/// The four-dimension sub-score set produced by analysis.
///
/// Each dimension is a real number in `0.0..=10.0`; the range is enforced
/// by [`overall_score`] rather than clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub relevance: f64,
    pub engagement: f64,
    pub clarity: f64,
    pub brand_consistency: f64,
}

impl ScoreBreakdown {
    /// The sub-scores paired with their field names, in canonical order.
    fn fields(&self) -> [(&'static str, f64); 4] {
        [
            ("relevance", self.relevance),
            ("engagement", self.engagement),
            ("clarity", self.clarity),
            ("brand_consistency", self.brand_consistency),
        ]
    }
}

// ---------------------------------------------------------------------------
// Overall score
// ---------------------------------------------------------------------------

/// Validate that a sub-score lies within `SCORE_MIN..=SCORE_MAX`.
///
/// Out-of-range input is a caller contract violation, never clamped.
pub fn validate_sub_score(value: f64, field: &'static str) -> Result<(), CoreError> {
    if !value.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&value) {
        return Err(CoreError::ScoreRange { field, value });
    }
    Ok(())
}

/// Compute the overall score: the arithmetic mean of the four sub-scores,
/// rounded to one decimal.
///
/// Fails with `CoreError::ScoreRange` if any sub-score is outside
/// `0.0..=10.0`.
pub fn overall_score(breakdown: &ScoreBreakdown) -> Result<f64, CoreError> {
    for (field, value) in breakdown.fields() {
        validate_sub_score(value, field)?;
    }
    let mean = (breakdown.relevance
        + breakdown.engagement
        + breakdown.clarity
        + breakdown.brand_consistency)
        / 4.0;
    Ok(round_to_tenth(mean))
}

/// Round a score to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Map an overall score to its status band.
///
/// Bands are inclusive on their lower bound: 9.0 exactly is `Excellent`,
/// 6.0 exactly is `Active`.
pub fn classify_score(overall: f64) -> AssetStatus {
    if overall >= EXCELLENT_THRESHOLD {
        AssetStatus::Excellent
    } else if overall >= ACTIVE_THRESHOLD {
        AssetStatus::Active
    } else {
        AssetStatus::NeedsImprovement
    }
}

// ---------------------------------------------------------------------------
// Alert severity
// ---------------------------------------------------------------------------

/// Severity attached to a derived metric observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// The metric moved up by at least the threshold.
    Success,
    /// The metric moved down by at least the threshold.
    Warning,
    /// Movement stayed within the threshold either way.
    Info,
}

/// Grade a metric delta against a threshold.
///
/// `threshold` is the magnitude of movement considered significant; only
/// the sign of `delta` decides between `Success` and `Warning`.
pub fn classify_alert_severity(delta: f64, threshold: f64) -> AlertSeverity {
    if delta >= threshold {
        AlertSeverity::Success
    } else if delta <= -threshold {
        AlertSeverity::Warning
    } else {
        AlertSeverity::Info
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
