//! In-process event bus for engine lifecycle events.
//!
//! The lifecycle manager publishes an [`EngineEvent`] after every entity
//! creation and transition; consumers (notification routers, audit sinks,
//! WebSocket fan-out) subscribe independently.

pub mod bus;

pub use bus::{EngineEvent, EventBus, EventKind};
