//! Entity storage for the AdLens engine.
//!
//! [`EntityStore`] is the in-memory authoritative collection of creative
//! assets and recommendations, with per-entity-id mutual exclusion and an
//! append-only transition history. [`PersistentStore`] is the contract for
//! the external durable store the engine writes through to.

pub mod memory;
pub mod persist;

pub use memory::{EntityStore, TransitionRecord};
pub use persist::{MemoryPersistence, PersistError, PersistentStore, StoreContents};
