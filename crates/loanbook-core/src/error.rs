use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanbookError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("{entity} with ID {id} not found")]
    NotFound { entity: String, id: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanbookError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanbookError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        LoanbookError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<serde_json::Error> for LoanbookError {
    fn from(e: serde_json::Error) -> Self {
        LoanbookError::SerializationError(e.to_string())
    }
}
