//! Bounded, retried, cancellable analysis calls.
//!
//! One [`AnalysisGateway::analyze`] call maps to at most
//! `max_retries + 1` provider attempts, each under its own deadline, with
//! exponential backoff in between. A semaphore caps concurrent outstanding
//! provider calls; excess callers queue on the permit rather than failing.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use adlens_core::scoring::{validate_sub_score, ScoreBreakdown};
use adlens_core::types::Timestamp;

use crate::provider::{AnalysisProvider, AnalysisRequest, ProviderError, ProviderResponse};
use crate::retry::{next_delay, RetryPolicy};

/// Default per-attempt deadline.
const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default cap on concurrent outstanding provider calls.
const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Tunable gateway parameters.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Deadline for a single provider attempt. Exceeding it counts as one
    /// transient failure, not a separate code path.
    pub attempt_timeout: Duration,
    /// Maximum concurrent outstanding provider calls.
    pub max_concurrency: usize,
    /// Backoff policy for transient failures.
    pub retry: RetryPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            retry: RetryPolicy::default(),
        }
    }
}

/// A validated, normalized analysis result.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub breakdown: ScoreBreakdown,
    pub feedback: Vec<String>,
    pub improvements: Vec<String>,
}

/// Why an analysis ultimately failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisFailure {
    #[error("attempt deadline exceeded")]
    Timeout,

    #[error("provider failure: {0}")]
    Provider(String),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("provider rejected the asset: {0}")]
    Rejected(String),

    #[error("analysis cancelled")]
    Cancelled,
}

/// Terminal analysis failure, produced after the retry budget is spent (or
/// immediately for non-retryable failures).
#[derive(Debug, Clone, thiserror::Error)]
#[error("Analysis failed: {reason}")]
pub struct AnalysisError {
    pub reason: AnalysisFailure,
    pub last_attempt_at: Timestamp,
}

/// Adapter between the lifecycle and the external analysis provider.
pub struct AnalysisGateway {
    provider: Arc<dyn AnalysisProvider>,
    config: GatewayConfig,
    permits: Semaphore,
}

impl AnalysisGateway {
    pub fn new(provider: Arc<dyn AnalysisProvider>, config: GatewayConfig) -> Self {
        let permits = Semaphore::new(config.max_concurrency);
        Self {
            provider,
            config,
            permits,
        }
    }

    /// Run one analysis under the gateway's timeout/retry/concurrency
    /// policy.
    ///
    /// Returns a normalized outcome, or an [`AnalysisError`] once the retry
    /// budget is exhausted, the provider permanently rejects the input, or
    /// `cancel` is triggered. Cancellation is honored while queued for a
    /// permit, mid-attempt, and between attempts.
    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let _permit = tokio::select! {
            _ = cancel.cancelled() => return Err(fail(AnalysisFailure::Cancelled)),
            permit = self.permits.acquire() => {
                permit.expect("gateway semaphore is never closed")
            }
        };

        let attempts = self.config.retry.max_retries + 1;
        let mut delay = self.config.retry.initial_backoff;
        let mut last_failure = AnalysisFailure::Provider("no attempt made".to_string());

        for attempt in 1..=attempts {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(fail(AnalysisFailure::Cancelled)),
                result = tokio::time::timeout(
                    self.config.attempt_timeout,
                    self.provider.analyze(request),
                ) => result,
            };

            match outcome {
                Ok(Ok(response)) => match normalize(response) {
                    Ok(normalized) => return Ok(normalized),
                    Err(detail) => {
                        tracing::warn!(
                            campaign_ref = %request.campaign_ref,
                            attempt,
                            detail = %detail,
                            "Provider response failed validation",
                        );
                        last_failure = AnalysisFailure::InvalidResponse(detail);
                    }
                },
                Ok(Err(ProviderError::Transient(detail))) => {
                    tracing::warn!(
                        campaign_ref = %request.campaign_ref,
                        attempt,
                        detail = %detail,
                        "Transient provider failure",
                    );
                    last_failure = AnalysisFailure::Provider(detail);
                }
                Ok(Err(ProviderError::Rejected(detail))) => {
                    tracing::warn!(
                        campaign_ref = %request.campaign_ref,
                        attempt,
                        detail = %detail,
                        "Provider rejected the asset",
                    );
                    return Err(fail(AnalysisFailure::Rejected(detail)));
                }
                Err(_elapsed) => {
                    tracing::warn!(
                        campaign_ref = %request.campaign_ref,
                        attempt,
                        timeout_ms = self.config.attempt_timeout.as_millis() as u64,
                        "Provider attempt timed out",
                    );
                    last_failure = AnalysisFailure::Timeout;
                }
            }

            if attempt < attempts {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(fail(AnalysisFailure::Cancelled)),
                    _ = tokio::time::sleep(delay) => {}
                }
                delay = next_delay(delay, &self.config.retry);
            }
        }

        Err(fail(last_failure))
    }
}

fn fail(reason: AnalysisFailure) -> AnalysisError {
    AnalysisError {
        reason,
        last_attempt_at: Utc::now(),
    }
}

/// Validate a raw provider response against the score-breakdown contract:
/// all four sub-scores present and within range.
fn normalize(response: ProviderResponse) -> Result<AnalysisOutcome, String> {
    let scores = &response.scores;
    let breakdown = ScoreBreakdown {
        relevance: scores.relevance.ok_or("missing sub-score: relevance")?,
        engagement: scores.engagement.ok_or("missing sub-score: engagement")?,
        clarity: scores.clarity.ok_or("missing sub-score: clarity")?,
        brand_consistency: scores
            .brand_consistency
            .ok_or("missing sub-score: brand_consistency")?,
    };

    for (field, value) in [
        ("relevance", breakdown.relevance),
        ("engagement", breakdown.engagement),
        ("clarity", breakdown.clarity),
        ("brand_consistency", breakdown.brand_consistency),
    ] {
        validate_sub_score(value, field).map_err(|e| e.to_string())?;
    }

    Ok(AnalysisOutcome {
        breakdown,
        feedback: response.feedback,
        improvements: response.improvements,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
