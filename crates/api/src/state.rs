use std::sync::Arc;

use adlens_engine::{InsightAggregator, LifecycleManager};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The intelligence engine: entity creation, transitions, analysis.
    pub manager: Arc<LifecycleManager>,
    /// Read-only aggregates over the entity store.
    pub aggregator: Arc<InsightAggregator>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
