use crate::types::EntityId;

/// Domain error taxonomy shared by every layer of the engine.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: EntityId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid transition for {entity} {id}: {detail}")]
    InvalidTransition {
        entity: &'static str,
        id: EntityId,
        detail: String,
    },

    #[error("Score out of range: {field} must be within 0.0..=10.0, got {value}")]
    ScoreRange { field: &'static str, value: f64 },
}
