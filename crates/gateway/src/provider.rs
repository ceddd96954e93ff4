//! Analysis provider contract and HTTP implementation.
//!
//! The provider is opaque to the engine beyond this request/response shape.
//! Score and status hints in the response are ignored downstream -- the
//! engine recomputes both so classification stays consistent regardless of
//! provider behavior.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use adlens_core::entities::{AssetKind, AssetPayload, Platform};

/// Request sent to the analysis provider for one creative asset.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    pub kind: AssetKind,
    pub platform: Platform,
    pub campaign_ref: String,
    pub payload: AssetPayload,
}

/// Raw sub-scores as returned by the provider.
///
/// Fields are optional so that a missing dimension is a validation failure
/// in the gateway rather than a hard deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderScores {
    pub relevance: Option<f64>,
    pub engagement: Option<f64>,
    pub clarity: Option<f64>,
    pub brand_consistency: Option<f64>,
}

/// Raw provider response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Provider's own overall score. Ignored -- recomputed internally.
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub scores: ProviderScores,
    #[serde(default)]
    pub feedback: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    /// Provider's status suggestion. Ignored -- recomputed internally.
    #[serde(default)]
    pub status_hint: Option<String>,
}

/// Errors from a provider call, split by whether a retry can help.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Network trouble, 5xx-equivalent, or an unreadable body. Retryable.
    #[error("Transient provider failure: {0}")]
    Transient(String),

    /// The provider permanently rejected this input. Not retryable.
    #[error("Provider rejected the request: {0}")]
    Rejected(String),
}

/// External scoring service for creative assets.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Score one asset. One call per attempt; the gateway owns deadlines
    /// and retries.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ProviderResponse, ProviderError>;
}

// ---------------------------------------------------------------------------
// HTTP provider
// ---------------------------------------------------------------------------

/// HTTP client for a provider exposing `POST {base}/analyze`.
pub struct HttpAnalysisProvider {
    client: reqwest::Client,
    api_url: String,
}

impl HttpAnalysisProvider {
    /// Create a client for a provider instance.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://host:8200`.
    pub fn new(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling).
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }
}

#[async_trait]
impl AnalysisProvider for HttpAnalysisProvider {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ProviderResponse, ProviderError> {
        let response = self
            .client
            .post(format!("{}/analyze", self.api_url))
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::Transient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if status.is_client_error() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ProviderError::Rejected(format!(
                "provider returned {status}: {body}"
            )));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ProviderError::Transient(format!(
                "provider returned {status}: {body}"
            )));
        }

        response
            .json::<ProviderResponse>()
            .await
            .map_err(|e| ProviderError::Transient(format!("unparseable provider body: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
