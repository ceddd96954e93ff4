//! Analysis provider gateway.
//!
//! Adapts the unreliable external analysis provider into a bounded,
//! retried, cancellable call: per-attempt deadlines, exponential backoff on
//! transient failures, a semaphore on concurrent outstanding calls, and
//! validation of the provider's response against the score-breakdown
//! contract before anything reaches the lifecycle.

pub mod gateway;
pub mod provider;
pub mod retry;

pub use gateway::{
    AnalysisError, AnalysisFailure, AnalysisGateway, AnalysisOutcome, GatewayConfig,
};
pub use provider::{
    AnalysisProvider, AnalysisRequest, HttpAnalysisProvider, ProviderError, ProviderResponse,
    ProviderScores,
};
pub use retry::RetryPolicy;
