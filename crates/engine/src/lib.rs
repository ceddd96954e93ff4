//! The AdLens intelligence engine.
//!
//! Wires the entity store, analysis gateway, and event bus together:
//! [`LifecycleManager`] is the sole authority for entity creation and
//! status transitions, [`InsightAggregator`] computes read-only aggregates
//! over store snapshots, and [`query`] applies the core query engine to
//! snapshots for external consumers.

pub mod insights;
pub mod lifecycle;
pub mod query;

pub use insights::{GroupAverage, InsightAggregator, InsightSummary, TrendAlert};
pub use lifecycle::{AnalysisResult, LifecycleManager};
