//! Broadcast event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`EngineEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the engine.

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;

use adlens_core::types::{EntityId, Timestamp};

// ---------------------------------------------------------------------------
// EngineEvent
// ---------------------------------------------------------------------------

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    AssetSubmitted,
    AssetAnalyzed,
    AssetAnalysisFailed,
    AssetReanalyzed,
    RecommendationSubmitted,
    RecommendationResolved,
}

/// A lifecycle event emitted by the engine.
///
/// Constructed via [`EngineEvent::new`] and optionally enriched with
/// [`with_detail`](EngineEvent::with_detail).
#[derive(Debug, Clone, Serialize)]
pub struct EngineEvent {
    pub kind: EventKind,
    /// The asset or recommendation the event concerns.
    pub entity_id: EntityId,
    /// Free-form JSON payload carrying event-specific data (new status,
    /// overall score, failure reason, ...).
    pub detail: serde_json::Value,
    /// When the event was created (UTC).
    pub occurred_at: Timestamp,
}

impl EngineEvent {
    /// Create a new event with an empty detail object.
    pub fn new(kind: EventKind, entity_id: EntityId) -> Self {
        Self {
            kind,
            entity_id,
            detail: serde_json::Value::Object(Default::default()),
            occurred_at: Utc::now(),
        }
    }

    /// Attach a JSON payload to the event.
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = detail;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`EngineEvent`].
pub struct EventBus {
    sender: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With zero subscribers the event is silently dropped.
    pub fn publish(&self, event: EngineEvent) {
        // Ignore the SendError -- it only means there are no receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
